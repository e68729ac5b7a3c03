//! Test fixtures - declaration snippets shaped like the upstream sources

use pano_bundle_core::MockFileSystem;

/// Header carrying the default npm version placeholder
pub fn header_template() -> &'static str {
    "/**\n * @version $npm_package_version$\n */\n\n"
}

pub fn shared_apis() -> &'static str {
    r#"declare namespace $ {
	function GetContextPanel(): Panel;
}
"#
}

pub fn shared_panels() -> &'static str {
    r#"interface Panel {
	id: string;
	visible: boolean;
}
"#
}

/// Mentions the codename the csgo bundle rewrites
pub fn shared_chaos_events() -> &'static str {
    r#"interface ChaosEventNameMap {
	'ChaosMainMenuOpened': () => void;
}
declare namespace ChaosSettings {}
"#
}

pub fn p2ce_campaign() -> &'static str {
    r#"declare namespace CampaignAPI {
	function GetActiveCampaign(): string | null;
}
"#
}

pub fn momentum_index() -> &'static str {
    r#"declare namespace MomentumTimerAPI {
	function GetTimerState(): number;
}
"#
}

/// In-memory tree with the default layout: header, shared, p2ce and momentum
/// modules plus a few files that must never be bundled
pub fn upstream_mock_fs() -> MockFileSystem {
    MockFileSystem::new()
        .with_file("src/header.d.ts", header_template())
        .with_file("src/shared/apis.d.ts", shared_apis())
        .with_file("src/shared/events.d.ts", shared_chaos_events())
        .with_file("src/shared/panels.d.ts", shared_panels())
        .with_file("src/shared/README.md", "# shared\n")
        .with_file("src/p2ce/campaign.d.ts", p2ce_campaign())
        .with_file("src/p2ce/tsconfig.json", "{}\n")
        .with_file("src/momentum/index.d.ts", momentum_index())
}
