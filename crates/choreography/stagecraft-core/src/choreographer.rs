//! Choreographer: one bound narrative section and its public API.
//!
//! Methods:
//! - bind / try_bind (resolver), on_scroll, on_resize (gate + measure), select,
//!   on_interaction, update (progress → cues → switcher → tweens), teardown
//!
//! Host callbacks only record input or queue advance requests. All visible work
//! happens inside `update`, once per frame, so one frame's writes always come
//! out together.

use std::collections::VecDeque;

use crate::autoplay::AutoplayScheduler;
use crate::binding::{resolve_group, resolve_opt, BindingTable, LayoutProbe, TargetHandle, TargetResolver};
use crate::config::SectionConfig;
use crate::cues::CueTrack;
use crate::error::BindError;
use crate::gate::{GateAction, ResponsiveGate};
use crate::inputs::{AdvanceRequest, AdvanceSource, Interaction};
use crate::outputs::{CoreEvent, Outputs};
use crate::progress::{Driver, PinnedScroll, ProgressSource, SourceKind, TimerProgress};
use crate::registry::{next_index, StageRegistry};
use crate::scrub::ScrubTrack;
use crate::side_channel::SideChannels;
use crate::switcher::{Phase, StageSwitcher, SwitcherBindings};
use crate::tween::path_draw::PathLengths;
use crate::tween::TweenSet;

#[derive(Debug)]
pub struct Choreographer {
    root: TargetHandle,
    pinned_class: String,

    // Systems
    switcher: StageSwitcher,
    tweens: TweenSet,
    lengths: PathLengths,
    driver: Option<Driver>,
    cues: CueTrack,
    scrubs: ScrubTrack,
    side: SideChannels,
    autoplay: Option<AutoplayScheduler>,
    gate: Option<ResponsiveGate>,

    queue: VecDeque<AdvanceRequest>,
    viewport_height: f64,
    pinned_live: bool,
    needs_measure: bool,
    started: bool,
    torn_down: bool,

    // Written between frames, flushed by the next update.
    staged: Outputs,
    outputs: Outputs,
}

impl Choreographer {
    /// Bind a section, or log why it cannot be bound and return `None`.
    pub fn bind(config: &SectionConfig, resolver: &mut dyn TargetResolver) -> Option<Self> {
        match Self::try_bind(config, resolver) {
            Ok(c) => Some(c),
            Err(err) => {
                log::warn!("section '{}' not bound: {err}", config.root);
                None
            }
        }
    }

    /// Bind a section. Fails without side effects when a required element is
    /// missing or the config is invalid.
    pub fn try_bind(
        config: &SectionConfig,
        resolver: &mut dyn TargetResolver,
    ) -> Result<Self, BindError> {
        config.validate()?;
        let root = resolver
            .resolve(&config.root)
            .ok_or_else(|| BindError::MissingElement(config.root.clone()))?;
        let region = match &config.pinned {
            Some(p) => Some(
                resolver
                    .resolve(&p.region)
                    .ok_or_else(|| BindError::MissingElement(p.region.clone()))?,
            ),
            None => None,
        };

        let mut fields = BindingTable::new();
        for (field, element_ref) in &config.fields {
            if let Some(handle) = resolve_opt(resolver, Some(element_ref.as_str())) {
                fields.upsert(field, handle);
            }
        }
        let indicators = resolve_group(resolver, config.indicators.as_ref());
        let indicator_count = config.indicators.as_ref().map(|_| indicators.len());
        let registry = StageRegistry::register(config.stages.clone(), indicator_count)?;

        let bindings = SwitcherBindings {
            fields,
            fade_targets: resolve_group(resolver, config.fade_targets.as_ref()),
            indicators,
            images: resolve_group(resolver, config.stage_images.as_ref()),
            indicator_style: config.indicator_style.clone(),
            fade: config.fade.clone(),
            active_class: config.active_class.clone(),
        };

        let cues = CueTrack::build(&config.cues, &config.labels, registry.len())?;
        let scrubs = ScrubTrack::bind(&config.scrubs, &config.labels, resolver)?;
        let side = SideChannels::bind(config, resolver);

        let driver = match (&config.pinned, region, &config.autoplay) {
            (Some(p), Some(region), _) => Some(Driver::Scroll(PinnedScroll::new(
                region,
                p.extent,
                p.smoothing_ms,
            ))),
            (_, _, Some(a)) => Some(Driver::Timer(TimerProgress::new(a.interval_ms, a.tick_ms))),
            _ => None,
        };
        let autoplay = config.autoplay.as_ref().map(AutoplayScheduler::new);
        let gate = config
            .pinned
            .as_ref()
            .map(|_| ResponsiveGate::new(config.responsive_breakpoint));

        log::debug!(
            "bound section '{}': {} stages, limit {}, {} cues",
            config.root,
            registry.len(),
            registry.limit(),
            cues.len()
        );

        let mut queue = VecDeque::new();
        queue.push_back(AdvanceRequest {
            target: 0,
            source: AdvanceSource::Bind,
        });

        Ok(Self {
            root,
            pinned_class: config.pinned_class.clone(),
            switcher: StageSwitcher::new(registry, bindings),
            tweens: TweenSet::new(),
            lengths: PathLengths::new(),
            driver,
            cues,
            scrubs,
            side,
            autoplay,
            gate,
            queue,
            viewport_height: 0.0,
            pinned_live: false,
            needs_measure: false,
            started: false,
            torn_down: false,
            staged: Outputs::default(),
            outputs: Outputs::default(),
        })
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Every element handle this section writes to.
    pub fn handles(&self) -> Vec<TargetHandle> {
        let mut all = vec![self.root.clone()];
        if let Some(Driver::Scroll(s)) = &self.driver {
            all.push(s.region().to_string());
        }
        all.extend(self.switcher.bindings().handles());
        all.extend(self.side.handles());
        all.extend(self.scrubs.handles().cloned());
        all.sort();
        all.dedup();
        all
    }

    pub fn current_index(&self) -> Option<usize> {
        self.switcher.current_index()
    }

    /// Pending target while a transition runs, otherwise the current stage.
    pub fn effective_index(&self) -> Option<usize> {
        self.switcher.effective_index()
    }

    pub fn phase(&self) -> Phase {
        self.switcher.phase()
    }

    pub fn mutation_count(&self) -> usize {
        self.switcher.mutation_count()
    }

    pub fn stage_limit(&self) -> usize {
        self.switcher.registry().limit()
    }

    pub fn source_kind(&self) -> Option<SourceKind> {
        self.driver.as_ref().map(|d| d.kind())
    }

    pub fn autoplay(&self) -> Option<&AutoplayScheduler> {
        self.autoplay.as_ref()
    }

    pub fn is_pinned_live(&self) -> bool {
        self.pinned_live
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn live_tweens(&self) -> usize {
        self.tweens.live_count()
    }

    /// Path lengths currently cached from the layout probe.
    pub fn measured_paths(&self) -> usize {
        self.lengths.len()
    }

    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    /// Recorded even while the pinned binding is down so a later create
    /// measures against the current offset.
    pub fn on_scroll(&mut self, scroll_y: f64) {
        if self.torn_down {
            return;
        }
        if let Some(Driver::Scroll(s)) = &mut self.driver {
            s.on_scroll(scroll_y);
        }
    }

    /// Viewport changed: evaluate the breakpoint and re-measure pinned layout.
    pub fn on_resize(&mut self, width: f64, height: f64, probe: &mut dyn LayoutProbe) {
        if self.torn_down {
            return;
        }
        self.viewport_height = height;
        let Some(gate) = &mut self.gate else {
            return;
        };
        match gate.evaluate(width) {
            GateAction::Destroy => self.destroy_pinned(),
            GateAction::Create => {
                self.pinned_live = true;
                self.measure(probe);
                if let Some(driver) = &mut self.driver {
                    driver.reset();
                }
                self.cues.reset();
                self.scrubs.invalidate();
                self.staged.push_event(CoreEvent::BindingCreated);
            }
            GateAction::None => {
                if self.pinned_live {
                    self.measure(probe);
                }
            }
        }
    }

    /// Manual selection: cancel the timer, advance, re-arm from now.
    pub fn select(&mut self, index: i64, now_ms: f64) {
        if self.torn_down {
            return;
        }
        self.queue.push_back(AdvanceRequest {
            target: index,
            source: AdvanceSource::Manual,
        });
        if let Some(autoplay) = &mut self.autoplay {
            autoplay.on_manual_select(now_ms);
            self.started = true;
        }
        self.restart_countdown(now_ms);
    }

    pub fn on_interaction(&mut self, interaction: Interaction, now_ms: f64) {
        if self.torn_down {
            return;
        }
        let Some(autoplay) = &mut self.autoplay else {
            return;
        };
        match autoplay.on_interaction(interaction, now_ms) {
            // held: freeze the countdown where it is
            Some(false) => {
                if let Some(Driver::Timer(t)) = &mut self.driver {
                    t.pause();
                }
            }
            Some(true) => self.restart_countdown(now_ms),
            None => {}
        }
    }

    /// Run one frame at `now_ms`.
    pub fn update(&mut self, now_ms: f64, probe: &mut dyn LayoutProbe) -> &Outputs {
        self.outputs.clear();
        self.outputs.changes.append(&mut self.staged.changes);
        self.outputs.events.append(&mut self.staged.events);
        if self.torn_down {
            return &self.outputs;
        }

        if !self.started {
            self.started = true;
            if let Some(autoplay) = &mut self.autoplay {
                autoplay.start(now_ms);
            }
            self.restart_countdown(now_ms);
        }

        if self.pinned_live && self.needs_measure {
            self.measure(probe);
        }
        self.side.retry_deferred(
            &mut self.tweens,
            &mut self.lengths,
            probe,
            now_ms,
            &mut self.outputs,
        );

        self.sample_driver(now_ms, probe);
        self.drain_queue(now_ms, probe);

        let ticks = match &mut self.autoplay {
            Some(autoplay) => autoplay.poll(now_ms),
            None => Vec::new(),
        };
        for at_ms in ticks {
            self.outputs.push_event(CoreEvent::AutoplayTick { at_ms });
            let heading = self.switcher.effective_index().unwrap_or(0);
            self.queue.push_back(AdvanceRequest {
                target: next_index(heading, self.stage_limit()) as i64,
                source: AdvanceSource::Autoplay,
            });
            self.drain_queue(now_ms, probe);
        }

        let done = self.tweens.step(now_ms, &mut self.outputs);
        self.side.on_completions(&done, &mut self.tweens, now_ms);
        self.switcher
            .on_frame(&mut self.tweens, now_ms, &mut self.outputs);
        &self.outputs
    }

    /// Drop every timer, tween, and scroll binding. Fields are left fully shown
    /// on the stage they were heading to; the next `update` reports those writes.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        if self.pinned_live {
            self.destroy_pinned();
        } else {
            self.release_live_state();
            self.staged.push_event(CoreEvent::BindingDestroyed);
        }
        if let Some(autoplay) = &mut self.autoplay {
            autoplay.pause();
        }
        if let Some(Driver::Timer(t)) = &mut self.driver {
            t.pause();
        }
        self.queue.clear();
        self.torn_down = true;
        log::debug!("section '{}' torn down", self.root);
    }

    fn destroy_pinned(&mut self) {
        if let Some(Driver::Scroll(s)) = &mut self.driver {
            s.release();
            if let Some(pinned) = s.take_pin_change() {
                self.staged.tag(s.region(), &self.pinned_class, pinned);
                self.staged.push_event(CoreEvent::PinChanged { pinned });
            }
        }
        self.release_live_state();
        self.pinned_live = false;
        self.staged.push_event(CoreEvent::BindingDestroyed);
    }

    /// Settle the switcher and drop tweens, measurements, and playheads.
    fn release_live_state(&mut self) {
        self.switcher.settle(&mut self.tweens, &mut self.staged);
        self.tweens.cancel_all();
        self.lengths.release();
        self.side.release();
        self.cues.reset();
        self.scrubs.invalidate();
        self.needs_measure = false;
    }

    fn measure(&mut self, probe: &mut dyn LayoutProbe) {
        let Some(Driver::Scroll(s)) = &mut self.driver else {
            return;
        };
        if s.measure(probe, self.viewport_height) {
            self.needs_measure = false;
        } else {
            if !self.needs_measure {
                self.staged.push_event(CoreEvent::MeasurementDeferred {
                    target: s.region().to_string(),
                });
            }
            self.needs_measure = true;
        }
    }

    fn sample_driver(&mut self, now_ms: f64, probe: &mut dyn LayoutProbe) {
        let Some(driver) = &mut self.driver else {
            return;
        };
        driver.advance_clock(now_ms);
        if let Driver::Scroll(s) = driver {
            if let Some(pinned) = s.take_pin_change() {
                self.outputs.tag(s.region(), &self.pinned_class, pinned);
                self.outputs.push_event(CoreEvent::PinChanged { pinned });
            }
        }
        let Some(progress) = driver.take_update() else {
            return;
        };
        self.outputs.progress = Some(progress);
        if progress.source != SourceKind::Scroll || !self.pinned_live {
            return;
        }
        let crossing = self.cues.advance(progress.value);
        for (label, direction) in crossing.signals {
            self.outputs
                .push_event(CoreEvent::CueFired { label, direction });
        }
        if let Some(stage) = crossing.stage {
            self.queue.push_back(AdvanceRequest {
                target: stage as i64,
                source: AdvanceSource::Cue,
            });
        }
        self.scrubs
            .apply(progress.value, &mut self.lengths, probe, &mut self.outputs);
    }

    fn drain_queue(&mut self, now_ms: f64, probe: &mut dyn LayoutProbe) {
        while let Some(req) = self.queue.pop_front() {
            let Some(target) =
                self.switcher
                    .request(req, &mut self.tweens, now_ms, &mut self.outputs)
            else {
                continue;
            };
            if let Some(stage) = self.switcher.registry().get(target).cloned() {
                self.side.fire(
                    &stage,
                    &mut self.tweens,
                    &mut self.lengths,
                    probe,
                    now_ms,
                    &mut self.outputs,
                );
            }
            if req.source != AdvanceSource::Bind {
                self.restart_countdown(now_ms);
            }
        }
    }

    /// Timer progress restarts from zero on every stage change and re-arm, and
    /// freezes while autoplay is paused.
    fn restart_countdown(&mut self, now_ms: f64) {
        let running = self.autoplay.as_ref().is_some_and(|a| a.is_running());
        if let Some(Driver::Timer(t)) = &mut self.driver {
            t.restart(now_ms);
            if !running {
                t.pause();
            }
        }
    }
}
