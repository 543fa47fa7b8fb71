mod app;
mod scenes;

use anyhow::Result;
use linkage_engine::device::GpuInit;
use linkage_engine::logging::{init_logging, LoggingConfig};
use linkage_engine::window::{Runtime, RuntimeConfig};

use app::StudioApp;
use scenes::SceneChoice;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let choice = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<SceneChoice>()?,
        None => SceneChoice::default(),
    };

    println!();
    println!("  ╔════════════════════════════════════════╗");
    println!("  ║          LINKAGE STUDIO v0.1           ║");
    println!("  ╠════════════════════════════════════════╣");
    println!("  ║  drag      rotate        space  pause  ║");
    println!("  ║  1-9       pick joint    ←/→    bend   ║");
    println!("  ║  wasdqe    translate     ↑/↓    tilt   ║");
    println!("  ║  wheel     zoom volume   r      reset  ║");
    println!("  ║  v         ortho view                  ║");
    println!("  ╚════════════════════════════════════════╝");
    println!("  scene: {choice}");
    println!();

    let config = RuntimeConfig {
        title: format!("linkage · {choice}"),
        ..RuntimeConfig::default()
    };
    Runtime::run(config, GpuInit::default(), StudioApp::new(choice))
}
