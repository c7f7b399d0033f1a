use std::cell::Cell;
use std::rc::Rc;

use super::{from_fn, Orchestrator, Phase, System};
use crate::entity::{self, EntityId};
use crate::error::{Error, Subject};
use crate::node::{Index, NodeSchema, NodeSchemaMeta};
use crate::test_util::{self, EventTracer, RecordingTracer, TraceEvent};
use crate::tracer::{self, Stage};
use crate::util::{self, Shared};

struct FixedIndex(Vec<EntityId>);

impl Index for FixedIndex {
    fn get_nodes_with_schema(&self, _: &NodeSchemaMeta) -> Vec<EntityId> { self.0.clone() }
}

fn any_schema() -> Rc<NodeSchemaMeta> { Rc::new(NodeSchemaMeta::new("Any", NodeSchema::default())) }

fn traced(name: &'static str, events: &Rc<EventTracer<&'static str>>) -> Shared<dyn System> {
    let events = Rc::clone(events);
    from_fn(name, any_schema(), move |_| {
        events.trace(name);
        Ok(())
    })
}

fn noop(name: &'static str) -> Shared<dyn System> { from_fn(name, any_schema(), |_| Ok(())) }

fn names(phase: &Phase) -> Vec<String> {
    phase.systems().map(|system| system.borrow().meta().name().to_string()).collect()
}

#[test]
fn test_systems_run_in_ascending_order() {
    test_util::init();

    let events = Rc::new(EventTracer::new([("first", "second"), ("second", "third")]));
    let mut phase = Phase::new("update");
    phase.add_system(traced("third", &events), 20).unwrap();
    phase.add_system(traced("first", &events), 0).unwrap();
    phase.add_system(traced("second", &events), 10).unwrap();

    phase.update(&FixedIndex(Vec::new()), &tracer::Noop);
    drop(phase);

    let events = Rc::try_unwrap(events).ok().expect("systems are still alive").get_events();
    assert_eq!(events, vec!["first", "second", "third"]);
}

#[test]
fn test_push_uses_current_length() {
    let mut phase = Phase::new("update");
    phase.push_system(noop("a")).unwrap();
    phase.add_system(noop("b"), 0).unwrap();
    phase.push_system(noop("c")).unwrap();
    phase.push_systems([noop("d"), noop("e")]).unwrap();
    phase.add_system(noop("f"), 2).unwrap();

    assert_eq!(names(&phase), vec!["a", "b", "c", "f", "d", "e"]);
}

#[test]
fn test_identity_is_the_handle() {
    let mut phase = Phase::new("update");
    let system = noop("same");
    let twin = noop("same");

    phase.push_system(Rc::clone(&system)).unwrap();
    assert!(phase.has_system(&system));
    assert!(!phase.has_system(&twin));
    phase.push_system(Rc::clone(&twin)).unwrap();

    let err = phase.push_system(Rc::clone(&system)).unwrap_err();
    assert!(matches!(
        err,
        Error::AlreadyPresent(Subject::System { system, phase })
            if system == "same" && phase == "update"
    ));

    let removed = phase.remove_system(&system).unwrap();
    assert!(util::same_rc(&removed, &system));
    assert!(matches!(phase.remove_system(&system), Err(Error::NotFound(Subject::System { .. }))));
    assert_eq!(phase.systems().count(), 1);
}

#[test]
fn test_push_systems_stops_at_duplicate() {
    let mut phase = Phase::new("update");
    let dup = noop("dup");
    let err = phase.push_systems([Rc::clone(&dup), noop("x"), dup, noop("never")]).unwrap_err();

    assert!(matches!(err, Error::AlreadyPresent(_)));
    assert_eq!(names(&phase), vec!["dup", "x"]);
}

#[test]
fn test_failures_are_isolated() {
    test_util::init();

    let mut entities = entity::Manager::default();
    let nodes = vec![entities.create(), entities.create()];
    let seen = Rc::new(Cell::new(0));
    let post_ran = Rc::new(Cell::new(false));

    let mut phase = Phase::new("sim")
        .with_pre_update(|| anyhow::bail!("pre broke"))
        .with_post_update({
            let post_ran = Rc::clone(&post_ran);
            move || {
                post_ran.set(true);
                Ok(())
            }
        });
    phase.push_system(from_fn("broken", any_schema(), |_| anyhow::bail!("system broke"))).unwrap();
    phase
        .push_system(from_fn("counter", any_schema(), {
            let seen = Rc::clone(&seen);
            move |nodes| {
                seen.set(nodes.len());
                Ok(())
            }
        }))
        .unwrap();

    let recorder = RecordingTracer::default();
    phase.update(&FixedIndex(nodes), &recorder);

    assert_eq!(seen.get(), 2);
    assert!(post_ran.get());

    let sim = || "sim".to_string();
    assert_eq!(
        recorder.take(),
        vec![
            TraceEvent::StartPhase(sim()),
            TraceEvent::CallbackFailed {
                phase: sim(),
                stage: Stage::PreUpdate,
                error: "pre broke".to_string(),
            },
            TraceEvent::StartSystem { phase: sim(), system: "broken".to_string(), nodes: 2 },
            TraceEvent::SystemFailed {
                phase:  sim(),
                system: "broken".to_string(),
                error:  "system broke".to_string(),
            },
            TraceEvent::EndSystem { phase: sim(), system: "broken".to_string() },
            TraceEvent::StartSystem { phase: sim(), system: "counter".to_string(), nodes: 2 },
            TraceEvent::EndSystem { phase: sim(), system: "counter".to_string() },
            TraceEvent::EndPhase(sim()),
        ]
    );
}

#[test]
fn test_post_update_failure_is_isolated() {
    test_util::init();

    let later_ran = Rc::new(Cell::new(false));

    let mut first = Phase::new("p").with_post_update(|| anyhow::bail!("post broke"));
    first.push_system(from_fn("idle", any_schema(), |_| Ok(()))).unwrap();
    let later = Phase::new("later").with_pre_update({
        let later_ran = Rc::clone(&later_ran);
        move || {
            later_ran.set(true);
            Ok(())
        }
    });

    let mut orchestrator = Orchestrator::default();
    orchestrator.push_phases([util::shared(first), util::shared(later)]).unwrap();

    let recorder = RecordingTracer::default();
    orchestrator.update(&FixedIndex(Vec::new()), &recorder);

    assert!(later_ran.get());
    let p = || "p".to_string();
    assert_eq!(
        recorder.take(),
        vec![
            TraceEvent::StartTick,
            TraceEvent::StartPhase(p()),
            TraceEvent::StartSystem { phase: p(), system: "idle".to_string(), nodes: 0 },
            TraceEvent::EndSystem { phase: p(), system: "idle".to_string() },
            TraceEvent::CallbackFailed {
                phase: p(),
                stage: Stage::PostUpdate,
                error: "post broke".to_string(),
            },
            TraceEvent::EndPhase(p()),
            TraceEvent::StartPhase("later".to_string()),
            TraceEvent::EndPhase("later".to_string()),
            TraceEvent::EndTick,
        ]
    );
}

#[test]
fn test_borrowed_system_is_skipped() {
    test_util::init();

    let ran = Rc::new(Cell::new(false));
    let busy = noop("busy");
    let mut phase = Phase::new("update");
    phase.push_system(Rc::clone(&busy)).unwrap();
    phase
        .push_system(from_fn("free", any_schema(), {
            let ran = Rc::clone(&ran);
            move |_| {
                ran.set(true);
                Ok(())
            }
        }))
        .unwrap();

    let recorder = RecordingTracer::default();
    {
        let _guard = busy.borrow_mut();
        phase.update(&FixedIndex(Vec::new()), &recorder);
    }

    assert!(ran.get());
    let events = recorder.take();
    assert!(matches!(
        &events[1],
        TraceEvent::SystemFailed { system, .. } if system == "#0"
    ));
}

#[test]
fn test_orchestrator_runs_every_phase_in_order() {
    test_util::init();

    let events = Rc::new(EventTracer::new([("input", "sim"), ("sim", "render")]));
    let orchestrator = {
        let mut orchestrator = Orchestrator::default();
        let phase = |name: &'static str| {
            let mut phase = Phase::new(name);
            phase.push_system(traced(name, &events)).unwrap();
            util::shared(phase)
        };
        orchestrator.add_phase(phase("render"), 5).unwrap();
        orchestrator.push_phases([phase("input"), phase("sim")]).unwrap();
        orchestrator
    };

    let order: Vec<_> =
        orchestrator.phases().map(|phase| phase.borrow().name().to_string()).collect();
    assert_eq!(order, vec!["input", "sim", "render"]);

    orchestrator.update(&FixedIndex(Vec::new()), &tracer::Noop);
    drop(orchestrator);

    let events = Rc::try_unwrap(events).ok().expect("phases are still alive").get_events();
    assert_eq!(events, vec!["input", "sim", "render"]);
}

#[test]
fn test_orchestrator_duplicates_and_busy_phases() {
    test_util::init();

    let mut orchestrator = Orchestrator::default();
    let first = util::shared(Phase::new("first"));
    let second = util::shared(Phase::new("second"));
    orchestrator.push_phases([Rc::clone(&first), Rc::clone(&second)]).unwrap();

    let err = orchestrator.push_phase(Rc::clone(&first)).unwrap_err();
    assert!(matches!(err, Error::AlreadyPresent(Subject::Phase(name)) if name == "first"));

    let recorder = RecordingTracer::default();
    {
        let _guard = first.borrow();
        orchestrator.update(&FixedIndex(Vec::new()), &recorder);
    }
    assert_eq!(
        recorder.take(),
        vec![
            TraceEvent::StartTick,
            TraceEvent::PhaseBusy(0),
            TraceEvent::StartPhase("second".to_string()),
            TraceEvent::EndPhase("second".to_string()),
            TraceEvent::EndTick,
        ]
    );

    orchestrator.remove_phase(&first).unwrap();
    assert!(matches!(orchestrator.remove_phase(&first), Err(Error::NotFound(Subject::Phase(_)))));
    assert!(orchestrator.has_phase(&second));
}
