/*
MIT License

Copyright (c) 2025 Vincent Hiribarren

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

use std::cell::RefCell;
use std::env;
use std::rc::Rc;

use log::info;

use crate::gpu_context::{Dimensions, GpuContext};
use crate::registry::SampleRegistry;
use crate::samples;
use crate::ui::{LogEditor, LogWorkspace, Workspace};
use crate::viewer::SampleViewer;
use crate::window;

const GLOBAL_LOG_FILTER: log::LevelFilter = log::LevelFilter::Info;
const ENV_HEADLESS: &str = "HEADLESS";
const ENV_STARTUP_SAMPLE: &str = "SHOWCASE_SAMPLE";
const HEADLESS_DIMENSIONS: Dimensions = Dimensions {
    width: 512,
    height: 512,
};
const HEADLESS_FRAMES_PER_SAMPLE: usize = 3;

/// Entry point of the viewer: sets up logging, then runs either the winit
/// event loop or the offscreen headless pass.
///
/// # Errors
///
/// Propagates the fatal conditions: no compatible graphics device, an empty
/// sample registry, or a failed startup activation.
pub fn launch() -> anyhow::Result<()> {
    init_log()?;
    info!("Init viewer");
    if env::var(ENV_HEADLESS).is_ok() {
        info!("Running in headless mode");
        run_headless()
    } else {
        window::run(env::var(ENV_STARTUP_SAMPLE).ok())
    }
}

fn init_log() -> anyhow::Result<()> {
    use fern::colors::{Color, ColoredLevelConfig};
    let colors = ColoredLevelConfig::new()
        .info(Color::Blue)
        .debug(Color::Green);
    fern::Dispatch::new()
        .chain(std::io::stdout())
        .level(GLOBAL_LOG_FILTER)
        .level_for(env!("CARGO_CRATE_NAME"), log::LevelFilter::Debug)
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}:{}] {}",
                chrono::Local::now().format("[%H:%M:%S]"),
                colors.color(record.level()),
                record.target(),
                record.line().unwrap_or_default(),
                message
            ));
        })
        .apply()?;
    Ok(())
}

/// Offscreen smoke pass: activates every valid sample in turn and ticks a
/// few frames against the texture target.
fn run_headless() -> anyhow::Result<()> {
    use pollster::FutureExt;

    let gpu = Rc::new(GpuContext::new(None, Some(HEADLESS_DIMENSIONS)).block_on()?);
    let registry = SampleRegistry::register_candidates(samples::candidates())?;
    let workspace: Rc<RefCell<dyn Workspace>> = Rc::new(RefCell::new(LogWorkspace));
    let mut viewer = SampleViewer::new(gpu, registry, workspace, Box::new(LogEditor));
    let names: Vec<String> = viewer.registry().names().map(str::to_owned).collect();
    for name in names {
        info!("Headless pass on sample '{name}'");
        viewer.activate(&name)?;
        viewer.handle_resize(HEADLESS_DIMENSIONS.width, HEADLESS_DIMENSIONS.height);
        for _ in 0..HEADLESS_FRAMES_PER_SAMPLE {
            viewer.frame_tick();
        }
    }
    Ok(())
}
