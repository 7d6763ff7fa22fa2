mod common;

use common::{bind_fixture, frame, run, TestHost};
use stagecraft_core::{
    AdvanceSource, Choreographer, Content, CoreEvent, Interaction, Phase, Property, SectionConfig,
};

fn expect_stage_rendered(host: &TestHost, config: &SectionConfig, index: usize) {
    let stage = &config.stages[index];
    for (field, element) in &config.fields {
        let Some(Content::Text(expected)) = stage.content.get(field) else {
            continue;
        };
        assert_eq!(
            host.text(element),
            Some(expected.as_str()),
            "field '{field}' on stage {index}"
        );
    }
}

#[test]
fn bind_renders_first_stage_without_fading() {
    let (mut ch, mut host, config) = bind_fixture("workflow");
    frame(&mut ch, &mut host, 0.0);

    assert_eq!(ch.current_index(), Some(0));
    assert_eq!(ch.phase(), Phase::Idle);
    assert_eq!(ch.mutation_count(), 1);
    expect_stage_rendered(&host, &config, 0);
    assert!(host.is_tagged("nav-pill-0", "active"));
    assert!(!host.is_tagged("nav-pill-1", "active"));
    // nothing was faded on the way in
    assert_eq!(host.scalar(".workflow-text", Property::Opacity), None);
}

#[test]
fn advance_from_idle_settles_with_every_field_matching() {
    let (mut ch, mut host, config) = bind_fixture("workflow");
    frame(&mut ch, &mut host, 0.0);

    ch.select(2, 100.0);
    frame(&mut ch, &mut host, 100.0);
    assert_eq!(ch.phase(), Phase::FadingOut { target: 2 });
    assert_eq!(ch.effective_index(), Some(2));
    assert_eq!(ch.current_index(), Some(0));

    run(&mut ch, &mut host, 116.0, 1500.0);
    assert_eq!(ch.phase(), Phase::Idle);
    assert_eq!(ch.current_index(), Some(2));
    assert_eq!(ch.mutation_count(), 2);
    expect_stage_rendered(&host, &config, 2);
    assert_eq!(host.scalar(".workflow-text", Property::Opacity), Some(1.0));
    assert_eq!(host.scalar(".workflow-text", Property::TranslateY), Some(0.0));
    assert!(host.is_tagged("nav-pill-2", "active"));
    assert!(!host.is_tagged("nav-pill-0", "active"));
    assert_eq!(host.settled(), vec![0, 2]);
}

#[test]
fn content_swaps_only_while_faded_out() {
    let (mut ch, mut host, _config) = bind_fixture("workflow");
    frame(&mut ch, &mut host, 0.0);
    ch.select(1, 100.0);

    let mut t = 100.0;
    while t < 1500.0 {
        let out = ch.update(t, &mut host).clone();
        let swap = out
            .changes
            .iter()
            .position(|c| c.target == ".step-title" && c.property == Property::Content);
        if let Some(swap) = swap {
            let opacity = out.changes[..swap]
                .iter()
                .rev()
                .find(|c| c.target == ".workflow-text" && c.property == Property::Opacity)
                .and_then(|c| c.value.as_scalar())
                .or_else(|| host.scalar(".workflow-text", Property::Opacity));
            assert_eq!(opacity, Some(0.0), "swap at {t}ms while visible");
        }
        host.apply(&out);
        t += common::FRAME_MS;
    }
    assert_eq!(ch.current_index(), Some(1));
}

#[test]
fn second_request_during_fade_out_swaps_once() {
    let (mut ch, mut host, config) = bind_fixture("workflow");
    frame(&mut ch, &mut host, 0.0);

    ch.select(1, 100.0);
    frame(&mut ch, &mut host, 100.0);
    ch.select(2, 150.0);
    frame(&mut ch, &mut host, 150.0);
    assert_eq!(ch.phase(), Phase::FadingOut { target: 2 });

    run(&mut ch, &mut host, 166.0, 2000.0);
    assert_eq!(ch.current_index(), Some(2));
    assert_eq!(ch.mutation_count(), 2);
    let swaps: Vec<_> = host
        .events
        .iter()
        .filter_map(|e| match e {
            CoreEvent::StageMutated { from, to } => Some((*from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(swaps, vec![(0, 0), (0, 2)]);
    expect_stage_rendered(&host, &config, 2);
}

#[test]
fn selecting_the_current_stage_is_a_no_op() {
    let (mut ch, mut host, _config) = bind_fixture("workflow");
    frame(&mut ch, &mut host, 0.0);
    ch.select(0, 50.0);
    frame(&mut ch, &mut host, 50.0);
    assert_eq!(ch.phase(), Phase::Idle);
    assert_eq!(ch.mutation_count(), 1);
    // wraps onto the current stage too
    ch.select(4, 60.0);
    frame(&mut ch, &mut host, 60.0);
    assert_eq!(ch.phase(), Phase::Idle);
}

#[test]
fn autoplay_cycles_and_wraps_to_the_first_stage() {
    let (mut ch, mut host, config) = bind_fixture("insights");
    run(&mut ch, &mut host, 0.0, 17_500.0);

    assert_eq!(host.settled(), vec![0, 1, 2, 3, 0]);
    assert_eq!(ch.current_index(), Some(0));
    expect_stage_rendered(&host, &config, 0);
    assert!(host.is_tagged("insight-bg-0", "active"));
    assert!(!host.is_tagged("insight-bg-3", "active"));
    let ticks: Vec<f64> = host
        .events
        .iter()
        .filter_map(|e| match e {
            CoreEvent::AutoplayTick { at_ms } => Some(*at_ms),
            _ => None,
        })
        .collect();
    assert_eq!(ticks, vec![4000.0, 8000.0, 12_000.0, 16_000.0]);
}

#[test]
fn manual_selection_rearms_the_timer_from_the_click() {
    let config = SectionConfig::from_json_str(
        r##"{
            "root": "#tabs",
            "autoplay": { "interval_ms": 4000 },
            "fields": { "title": "#title" },
            "indicators": ["#tab-a", "#tab-b", "#tab-c"],
            "stages": [
                { "index": 0, "content": { "title": { "text": "A" } } },
                { "index": 1, "content": { "title": { "text": "B" } } },
                { "index": 2, "content": { "title": { "text": "C" } } }
            ]
        }"##,
    )
    .unwrap();
    let mut host = TestHost::with_elements(&["#tabs", "#title", "#tab-a", "#tab-b", "#tab-c"]);
    let mut ch = Choreographer::try_bind(&config, &mut host).unwrap();

    let mut t = 0.0;
    while t <= 5000.0 {
        if t == 1000.0 {
            ch.select(2, t);
        }
        frame(&mut ch, &mut host, t);
        t += 100.0;
    }

    let requests: Vec<(usize, AdvanceSource)> = host
        .events
        .iter()
        .filter_map(|e| match e {
            CoreEvent::AdvanceRequested { target, source } => Some((*target, *source)),
            _ => None,
        })
        .collect();
    assert_eq!(
        requests,
        vec![
            (0, AdvanceSource::Bind),
            (2, AdvanceSource::Manual),
            (0, AdvanceSource::Autoplay),
        ]
    );
    assert!(host
        .events
        .contains(&CoreEvent::AutoplayTick { at_ms: 5000.0 }));
    assert_eq!(ch.autoplay().and_then(|a| a.next_due()), Some(9000.0));
}

#[test]
fn hover_holds_autoplay_until_the_pointer_leaves() {
    let (mut ch, mut host, _config) = bind_fixture("workflow");
    frame(&mut ch, &mut host, 0.0);
    ch.on_interaction(Interaction::PointerEnter, 1000.0);
    run(&mut ch, &mut host, 1000.0, 9000.0);
    assert_eq!(
        host.count(|e| matches!(e, CoreEvent::AutoplayTick { .. })),
        0
    );
    assert_eq!(ch.current_index(), Some(0));

    ch.on_interaction(Interaction::PointerLeave, 9000.0);
    assert_eq!(ch.autoplay().and_then(|a| a.next_due()), Some(13_000.0));
    run(&mut ch, &mut host, 9016.0, 14_500.0);
    assert_eq!(ch.current_index(), Some(1));
}

#[test]
fn hover_freezes_the_countdown_without_resetting_it() {
    let (mut ch, mut host, _config) = bind_fixture("workflow");
    let mut last = None;
    let mut t = 0.0;
    while t <= 2000.0 {
        frame(&mut ch, &mut host, t);
        if let Some(p) = ch.outputs().progress {
            last = Some(p.value);
        }
        t += 100.0;
    }
    let before = last.unwrap();
    assert!((before - 0.5).abs() < 1e-3, "progress {before}");

    ch.on_interaction(Interaction::PointerEnter, 2050.0);
    let mut t = 2100.0;
    while t <= 6000.0 {
        frame(&mut ch, &mut host, t);
        assert_eq!(ch.outputs().progress, None, "frozen at {t}");
        t += 100.0;
    }

    // leaving re-arms from zero
    ch.on_interaction(Interaction::PointerLeave, 6050.0);
    frame(&mut ch, &mut host, 6100.0);
    assert_eq!(ch.outputs().progress.map(|p| p.value), Some(0.0));
}

#[test]
fn extra_indicators_do_not_extend_the_cycle() {
    let (mut ch, mut host, _config) = bind_fixture("workflow-six-pills");
    assert_eq!(ch.stage_limit(), 4);
    frame(&mut ch, &mut host, 0.0);

    ch.select(5, 100.0);
    run(&mut ch, &mut host, 100.0, 1500.0);
    assert_eq!(ch.current_index(), Some(1));
    assert!(host.is_tagged("nav-pill-1", "active"));
    assert!(!host.is_tagged("nav-pill-5", "active"));

    ch.select(3, 1500.0);
    run(&mut ch, &mut host, 1500.0, 3000.0);
    assert_eq!(ch.current_index(), Some(3));
    // next autoplay tick wraps at the stage count, not the pill count
    run(&mut ch, &mut host, 3016.0, 7000.0);
    assert_eq!(ch.current_index(), Some(0));
}

#[test]
fn teardown_stops_timers_and_shows_fields() {
    let (mut ch, mut host, config) = bind_fixture("workflow");
    frame(&mut ch, &mut host, 0.0);
    ch.select(3, 100.0);
    run(&mut ch, &mut host, 100.0, 200.0);
    assert!(matches!(ch.phase(), Phase::FadingOut { .. }));
    assert_eq!(ch.measured_paths(), 1);

    ch.teardown();
    frame(&mut ch, &mut host, 216.0);
    assert!(ch.is_torn_down());
    assert_eq!(ch.live_tweens(), 0);
    assert_eq!(ch.measured_paths(), 0);
    assert_eq!(ch.current_index(), Some(3));
    expect_stage_rendered(&host, &config, 3);
    assert_eq!(host.scalar(".workflow-text", Property::Opacity), Some(1.0));
    assert_eq!(host.count(|e| matches!(e, CoreEvent::BindingDestroyed)), 1);

    let before = host.events.len();
    ch.select(1, 300.0);
    run(&mut ch, &mut host, 300.0, 10_000.0);
    assert_eq!(host.events.len(), before);
    assert_eq!(ch.current_index(), Some(3));
}

#[test]
fn missing_root_fails_binding() {
    let json = stagecraft_test_fixtures::sections::json("workflow").unwrap();
    let config = SectionConfig::from_json_str(&json).unwrap();
    let mut host = TestHost::with_elements(&[".step-title"]);
    assert!(Choreographer::bind(&config, &mut host).is_none());
    assert!(matches!(
        Choreographer::try_bind(&config, &mut host),
        Err(stagecraft_core::BindError::MissingElement(r)) if r == ".workflow-card"
    ));
}
