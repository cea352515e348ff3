//! Scenario tests for the sample lifecycle: registration, activation,
//! scheduling, reload and resize, driven through scripted samples so no GPU
//! is involved.

use std::cell::RefCell;
use std::rc::Rc;

use wgpu_showcase::frame_loop::FrameLoop;
use wgpu_showcase::registry::{Capabilities, RegistryError, SampleCandidate, SampleRegistry};
use wgpu_showcase::sample::{Sample, SampleContext, ShaderMap};
use wgpu_showcase::shader::ShaderError;
use wgpu_showcase::ui::{EditorSink, PanelSpec, Workspace};
use wgpu_showcase::viewer::{ActivationError, DrawSurface, SampleViewer};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Constructed(&'static str),
    Initialized(&'static str),
    /// A draw, tagged with the pipeline generation in use at that point.
    Drew(&'static str, u64),
    Resized(&'static str, u32, u32),
    Reloaded(&'static str, String),
    PanelsCleared,
    Reconfigured(u32, u32),
}

#[derive(Clone, Default)]
struct Recorder {
    events: Rc<RefCell<Vec<Event>>>,
    loops: Rc<RefCell<Vec<(&'static str, Rc<FrameLoop>)>>>,
}

impl Recorder {
    fn push(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }

    fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    fn events_from(&self, start: usize) -> Vec<Event> {
        self.events.borrow()[start..].to_vec()
    }

    fn len(&self) -> usize {
        self.events.borrow().len()
    }

    fn frame_loop_of(&self, tag: &str) -> Rc<FrameLoop> {
        self.loops
            .borrow()
            .iter()
            .rev()
            .find(|(t, _)| *t == tag)
            .map(|(_, frame_loop)| Rc::clone(frame_loop))
            .expect("sample was never constructed")
    }
}

#[derive(Clone)]
struct FakeSurface {
    recorder: Recorder,
}

impl DrawSurface for FakeSurface {
    fn reconfigure(&self, width: u32, height: u32) {
        self.recorder.push(Event::Reconfigured(width, height));
    }
}

struct TestWorkspace {
    recorder: Recorder,
}

impl Workspace for TestWorkspace {
    fn clear(&mut self) {
        self.recorder.push(Event::PanelsCleared);
    }

    fn add_panel(&mut self, _panel: PanelSpec) {}

    fn alert(&mut self, _title: &str, _message: &str) {}
}

#[derive(Clone, Default)]
struct TestEditor {
    synced: Rc<RefCell<Vec<ShaderMap>>>,
}

impl EditorSink for TestEditor {
    fn sync_shaders(&mut self, shaders: &ShaderMap) {
        self.synced.borrow_mut().push(shaders.clone());
    }
}

/// Scripted sample: records every lifecycle call, fails reloads whose source
/// contains "malformed", and can start animating or fail initialization on
/// demand.
struct ScriptedSample {
    tag: &'static str,
    recorder: Recorder,
    frame_loop: Rc<FrameLoop>,
    animate_on_init: bool,
    fail_init: bool,
    stop_after_draws: Option<u64>,
    sources: ShaderMap,
    pipeline_generation: u64,
    draws: u64,
}

impl Sample for ScriptedSample {
    fn initialize(&mut self) -> anyhow::Result<()> {
        self.recorder.push(Event::Initialized(self.tag));
        if self.fail_init {
            anyhow::bail!("initialization exploded");
        }
        if self.animate_on_init {
            self.frame_loop.animate();
        }
        Ok(())
    }

    fn draw(&mut self) -> anyhow::Result<()> {
        self.draws += 1;
        self.recorder
            .push(Event::Drew(self.tag, self.pipeline_generation));
        if self.stop_after_draws == Some(self.draws) {
            self.frame_loop.stop();
        }
        Ok(())
    }

    fn shaders(&self) -> ShaderMap {
        self.sources.clone()
    }

    fn reload(&mut self, shader_name: &str, shader_source: &str) -> Result<(), ShaderError> {
        if !self.sources.contains_key(shader_name) {
            return Ok(());
        }
        if shader_source.contains("malformed") {
            return Err(ShaderError::Parse {
                name: shader_name.to_owned(),
                detail: "scripted failure".to_owned(),
            });
        }
        self.pipeline_generation += 1;
        self.sources
            .insert(shader_name.to_owned(), shader_source.to_owned());
        self.recorder
            .push(Event::Reloaded(self.tag, shader_source.to_owned()));
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.recorder.push(Event::Resized(self.tag, width, height));
    }

    fn name(&self) -> &str {
        self.tag
    }
}

#[derive(Clone, Copy, Default)]
struct SampleScript {
    animate_on_init: bool,
    fail_init: bool,
    stop_after_draws: Option<u64>,
}

fn scripted_candidate(
    tag: &'static str,
    recorder: &Recorder,
    script: SampleScript,
    shaders: &[(&str, &str)],
) -> SampleCandidate<FakeSurface> {
    let recorder = recorder.clone();
    let sources: ShaderMap = shaders
        .iter()
        .map(|(name, source)| ((*name).to_owned(), (*source).to_owned()))
        .collect();
    SampleCandidate::new(tag, Capabilities::all(), move |ctx: SampleContext<FakeSurface>| {
        recorder.push(Event::Constructed(tag));
        recorder
            .loops
            .borrow_mut()
            .push((tag, Rc::clone(&ctx.frame_loop)));
        Box::new(ScriptedSample {
            tag,
            recorder: recorder.clone(),
            frame_loop: Rc::clone(&ctx.frame_loop),
            animate_on_init: script.animate_on_init,
            fail_init: script.fail_init,
            stop_after_draws: script.stop_after_draws,
            sources: sources.clone(),
            pipeline_generation: 0,
            draws: 0,
        })
    })
}

fn viewer_with(
    recorder: &Recorder,
    candidates: Vec<SampleCandidate<FakeSurface>>,
    editor: TestEditor,
) -> SampleViewer<FakeSurface> {
    let registry =
        SampleRegistry::register_candidates(candidates).expect("at least one valid candidate");
    SampleViewer::new(
        FakeSurface {
            recorder: recorder.clone(),
        },
        registry,
        Rc::new(RefCell::new(TestWorkspace {
            recorder: recorder.clone(),
        })),
        Box::new(editor),
    )
}

#[test]
fn rejected_candidates_are_never_activatable() {
    let recorder = Recorder::default();
    let valid = scripted_candidate("A", &recorder, SampleScript::default(), &[("X", "v0")]);
    let mut invalid =
        scripted_candidate("B", &recorder, SampleScript::default(), &[("Y", "v0")]);
    invalid.provides = Capabilities::all().difference(Capabilities::DRAW);

    let editor = TestEditor::default();
    let mut viewer = viewer_with(&recorder, vec![valid, invalid], editor.clone());
    assert_eq!(viewer.registry().names().collect::<Vec<_>>(), vec!["A"]);

    let err = viewer.activate("B").expect_err("B was rejected");
    assert!(
        matches!(err, ActivationError::Rejected { ref name, missing } if name == "B" && missing == Capabilities::DRAW),
        "got {err:?}"
    );
    assert_eq!(viewer.active_name(), None);

    viewer.activate("A").expect("A is valid");
    assert_eq!(viewer.active_name(), Some("A"));
    let synced = editor.synced.borrow();
    assert_eq!(synced.len(), 1);
    assert_eq!(synced[0].get("X").map(String::as_str), Some("v0"));
}

#[test]
fn unknown_sample_name_reports_not_found() {
    let recorder = Recorder::default();
    let mut viewer = viewer_with(
        &recorder,
        vec![scripted_candidate(
            "A",
            &recorder,
            SampleScript::default(),
            &[],
        )],
        TestEditor::default(),
    );
    let err = viewer.activate("Nope").expect_err("never registered");
    assert!(matches!(err, ActivationError::NotFound(ref name) if name == "Nope"));
}

#[test]
fn registration_without_any_valid_candidate_is_fatal() {
    let recorder = Recorder::default();
    let mut invalid =
        scripted_candidate("B", &recorder, SampleScript::default(), &[]);
    invalid.provides = Capabilities::empty();
    let result = SampleRegistry::register_candidates(vec![invalid]);
    assert!(matches!(result, Err(RegistryError::Empty)));
}

#[test]
fn failed_initialization_leaves_no_sample_active() {
    let recorder = Recorder::default();
    let mut viewer = viewer_with(
        &recorder,
        vec![
            scripted_candidate("A", &recorder, SampleScript::default(), &[]),
            scripted_candidate(
                "B",
                &recorder,
                SampleScript {
                    fail_init: true,
                    ..SampleScript::default()
                },
                &[],
            ),
        ],
        TestEditor::default(),
    );

    viewer.activate("A").expect("A initializes fine");
    let err = viewer.activate("B").expect_err("B fails to initialize");
    assert!(matches!(err, ActivationError::Initialize { ref name, .. } if name == "B"));
    assert_eq!(viewer.active_name(), None);

    // The predecessor is already torn down; nothing draws anymore.
    let before = recorder.len();
    viewer.handle_resize(640, 480);
    viewer.frame_tick();
    assert_eq!(
        recorder.events_from(before),
        vec![Event::Reconfigured(640, 480)]
    );

    // Recovery by activating a valid sample again is possible.
    viewer.activate("A").expect("A still activates");
    assert_eq!(viewer.active_name(), Some("A"));
}

#[test]
fn resize_reconfigures_surface_then_sample_then_draws_once() {
    let recorder = Recorder::default();
    let mut viewer = viewer_with(
        &recorder,
        vec![scripted_candidate(
            "Triangle",
            &recorder,
            SampleScript::default(),
            &[("Triangle", "v0")],
        )],
        TestEditor::default(),
    );
    viewer.activate("Triangle").expect("valid sample");

    let before = recorder.len();
    viewer.handle_resize(800, 600);
    assert!(viewer.has_pending_resize());
    viewer.frame_tick();
    assert_eq!(
        recorder.events_from(before),
        vec![
            Event::Reconfigured(800, 600),
            Event::Resized("Triangle", 800, 600),
            Event::Drew("Triangle", 0),
        ]
    );

    // Idle sample: no further draw happens on the next tick.
    let before = recorder.len();
    assert!(!viewer.frame_tick());
    assert_eq!(recorder.events_from(before), Vec::new());
}

#[test]
fn resize_bursts_coalesce_to_the_latest_target() {
    let recorder = Recorder::default();
    let mut viewer = viewer_with(
        &recorder,
        vec![scripted_candidate(
            "A",
            &recorder,
            SampleScript::default(),
            &[],
        )],
        TestEditor::default(),
    );
    viewer.activate("A").expect("valid sample");

    let before = recorder.len();
    viewer.handle_resize(100, 100);
    viewer.handle_resize(300, 200);
    viewer.handle_resize(800, 600);
    viewer.frame_tick();
    assert_eq!(
        recorder.events_from(before),
        vec![
            Event::Reconfigured(800, 600),
            Event::Resized("A", 800, 600),
            Event::Drew("A", 0),
        ]
    );
}

#[test]
fn scheduled_sample_draws_once_per_tick_until_stopped() {
    let recorder = Recorder::default();
    let mut viewer = viewer_with(
        &recorder,
        vec![scripted_candidate(
            "Anim",
            &recorder,
            SampleScript {
                animate_on_init: true,
                stop_after_draws: Some(2),
                ..SampleScript::default()
            },
            &[],
        )],
        TestEditor::default(),
    );
    viewer.activate("Anim").expect("valid sample");
    assert!(viewer.is_animating());

    let before = recorder.len();
    // First tick draws and stays scheduled.
    assert!(viewer.frame_tick());
    // Second tick draws; the sample stops its own loop mid-draw, so the
    // draw completes but no further frame is requested.
    assert!(!viewer.frame_tick());
    // Third tick: idle, nothing drawn.
    assert!(!viewer.frame_tick());
    assert_eq!(
        recorder.events_from(before),
        vec![Event::Drew("Anim", 0), Event::Drew("Anim", 0)]
    );
    assert!(!viewer.is_animating());
}

#[test]
fn reload_round_trips_into_the_shader_map() {
    let recorder = Recorder::default();
    let mut viewer = viewer_with(
        &recorder,
        vec![scripted_candidate(
            "A",
            &recorder,
            SampleScript::default(),
            &[("X", "v0")],
        )],
        TestEditor::default(),
    );
    viewer.activate("A").expect("valid sample");

    let before = recorder.len();
    viewer.reload("X", "v1");
    // The rebuilt pipeline (generation 1) drives the explicit post-reload draw.
    assert_eq!(
        recorder.events_from(before),
        vec![
            Event::Reloaded("A", "v1".to_owned()),
            Event::Drew("A", 1),
        ]
    );
    let shaders = viewer.active_shaders().expect("a sample is active");
    assert_eq!(shaders.get("X").map(String::as_str), Some("v1"));
}

#[test]
fn reload_of_an_unknown_shader_name_is_a_noop() {
    let recorder = Recorder::default();
    let mut viewer = viewer_with(
        &recorder,
        vec![scripted_candidate(
            "A",
            &recorder,
            SampleScript::default(),
            &[("X", "v0")],
        )],
        TestEditor::default(),
    );
    viewer.activate("A").expect("valid sample");

    viewer.reload("StaleTabFromPreviousSample", "whatever");
    let shaders = viewer.active_shaders().expect("a sample is active");
    assert_eq!(shaders.get("X").map(String::as_str), Some("v0"));
    assert_eq!(shaders.len(), 1);
    // No pipeline rebuild happened: the post-reload draw still uses
    // generation 0.
    assert!(recorder.events().contains(&Event::Drew("A", 0)));
    assert!(
        !recorder
            .events()
            .iter()
            .any(|event| matches!(event, Event::Reloaded(..)))
    );
}

#[test]
fn failed_reload_keeps_the_previous_pipeline() {
    let recorder = Recorder::default();
    let mut viewer = viewer_with(
        &recorder,
        vec![scripted_candidate(
            "A",
            &recorder,
            SampleScript::default(),
            &[("X", "v0")],
        )],
        TestEditor::default(),
    );
    viewer.activate("A").expect("valid sample");
    viewer.reload("X", "v1");

    let before = recorder.len();
    viewer.reload("X", "malformed v2");
    // Failure path: no reload event, no draw.
    assert_eq!(recorder.events_from(before), Vec::new());
    let shaders = viewer.active_shaders().expect("a sample is active");
    assert_eq!(shaders.get("X").map(String::as_str), Some("v1"));

    // The next draw still runs on the pipeline from the successful reload.
    viewer.handle_resize(640, 480);
    viewer.frame_tick();
    assert!(recorder.events().contains(&Event::Drew("A", 1)));
    assert!(!recorder.events().iter().any(|event| matches!(event, Event::Drew("A", 2))));
}

#[test]
fn activation_stops_the_predecessor_before_the_successor_initializes() {
    let recorder = Recorder::default();
    let mut viewer = viewer_with(
        &recorder,
        vec![
            scripted_candidate(
                "A",
                &recorder,
                SampleScript {
                    animate_on_init: true,
                    ..SampleScript::default()
                },
                &[],
            ),
            scripted_candidate("B", &recorder, SampleScript::default(), &[]),
        ],
        TestEditor::default(),
    );

    viewer.activate("A").expect("valid sample");
    assert!(viewer.frame_tick());
    let a_loop = recorder.frame_loop_of("A");
    assert!(a_loop.is_scheduled());

    viewer.activate("B").expect("valid sample");
    assert!(!a_loop.is_scheduled());

    let events = recorder.events();
    let last_a_draw = events
        .iter()
        .rposition(|event| matches!(event, Event::Drew("A", _)))
        .expect("A drew at least once");
    let cleared = events
        .iter()
        .position(|event| *event == Event::PanelsCleared)
        .expect("panels were cleared");
    let b_initialized = events
        .iter()
        .position(|event| *event == Event::Initialized("B"))
        .expect("B initialized");
    assert!(last_a_draw < cleared && cleared < b_initialized);

    // Every subsequent draw belongs to B's scheduler state, never to A.
    let before = recorder.len();
    viewer.frame_tick();
    assert!(
        !recorder
            .events_from(before)
            .iter()
            .any(|event| matches!(event, Event::Drew("A", _)))
    );
}

#[test]
fn every_activation_resynchronizes_the_editor() {
    let recorder = Recorder::default();
    let editor = TestEditor::default();
    let mut viewer = viewer_with(
        &recorder,
        vec![
            scripted_candidate("A", &recorder, SampleScript::default(), &[("X", "ax")]),
            scripted_candidate("B", &recorder, SampleScript::default(), &[("Y", "by")]),
        ],
        editor.clone(),
    );

    viewer.activate("A").expect("valid sample");
    viewer.activate("B").expect("valid sample");
    let synced = editor.synced.borrow();
    assert_eq!(synced.len(), 2);
    assert!(synced[0].contains_key("X"));
    assert!(synced[1].contains_key("Y"));
}
