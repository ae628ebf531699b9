//! Pointer and touch state machine for the map canvas.
//!
//! Every input goes through [`Session::handle`], which mutates the session
//! and returns the [`Effect`]s the render and persistence layers must carry
//! out. No DOM, no I/O.

use crate::catalog::Catalog;
use crate::models::{City, EntityId, Position};
use crate::session::Session;

/// Screen pixels a mouse press may wander before it counts as a drag.
pub const DRAG_THRESHOLD: f64 = 3.0;
/// Same for touch, which is less precise.
pub const TOUCH_DRAG_THRESHOLD: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

/// How an active pan gesture is driven.
#[derive(Debug, Clone, PartialEq)]
pub enum PanGesture {
    /// Pointer or one finger; pan follows the delta from `start`.
    Drag {
        start: Position,
        origin: Position,
        threshold: f64,
        moved: bool,
        /// Released without moving counts as a click at `start`.
        click: bool,
    },
    /// Two fingers; zoom follows the distance ratio between frames.
    Pinch { last_distance: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Idle,
    Placing(EntityId),
    Dragging {
        id: EntityId,
        grab_offset: Position,
    },
    Panning {
        gesture: PanGesture,
        /// Pending placement suspended for the duration of the pan.
        resume: Option<EntityId>,
    },
}

impl Mode {
    pub fn placing_id(&self) -> Option<&str> {
        match self {
            Mode::Placing(id) => Some(id),
            _ => None,
        }
    }

    pub fn dragging_id(&self) -> Option<&str> {
        match self {
            Mode::Dragging { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn is_panning(&self) -> bool {
        matches!(self, Mode::Panning { .. })
    }

    /// Placement waiting for a click, even while a pan is in progress.
    pub fn pending_placement(&self) -> Option<&str> {
        match self {
            Mode::Placing(id) => Some(id),
            Mode::Panning { resume, .. } => resume.as_deref(),
            _ => None,
        }
    }
}

/// Raw input, already in viewport-relative screen coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionEvent {
    PointerDown {
        at: Position,
        button: PointerButton,
    },
    PointerMove {
        at: Position,
    },
    PointerUp {
        at: Position,
    },
    /// Pointer left the viewport; ends a gesture without a click.
    PointerLeave,
    Wheel {
        at: Position,
        delta_y: f64,
    },
    ContextMenu {
        at: Position,
    },
    TouchStart {
        touches: Vec<Position>,
    },
    TouchMove {
        touches: Vec<Position>,
    },
    TouchEnd {
        remaining: Vec<Position>,
    },
    TouchCancel,
    Escape,
}

/// User-visible, non-blocking notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Placed,
    PlacementRemoved,
    PositionsReset,
    ImageUploaded,
    Exported,
    Imported,
    ImportMalformed,
    MemoSaved,
    MemoDeleted,
    SaveFailed(String),
    LoadFailed(String),
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::Placed => write!(f, "Placed on the map"),
            Notice::PlacementRemoved => write!(f, "Placement removed"),
            Notice::PositionsReset => write!(f, "All placements cleared"),
            Notice::ImageUploaded => write!(f, "Map image uploaded"),
            Notice::Exported => write!(f, "Data exported"),
            Notice::Imported => write!(f, "Data imported"),
            Notice::ImportMalformed => write!(f, "The file format is not valid"),
            Notice::MemoSaved => write!(f, "Memo saved"),
            Notice::MemoDeleted => write!(f, "Memo deleted"),
            Notice::SaveFailed(e) => write!(f, "Save failed: {e}"),
            Notice::LoadFailed(e) => write!(f, "Load failed: {e}"),
        }
    }
}

/// Work the outer layers perform after a state change.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Re-apply the content layer transform and zoom readout.
    ApplyTransform,
    RenderMarkers,
    RenderList,
    RenderDetail,
    /// Write the viewport+placement snapshot to the local store.
    Persist,
    /// Write (or delete) a city's background image.
    PersistImage(City),
    /// Push the memo lists to the remote store.
    SyncMemos,
    /// Reload the background image element for the current city.
    LoadImage,
    Notify(Notice),
    ShowContextMenu {
        id: EntityId,
        at: Position,
    },
    RevealInList(EntityId),
}

/// Ordered effect list without duplicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Effects(Vec<Effect>);

impl Effects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, effect: Effect) {
        if !self.0.contains(&effect) {
            self.0.push(effect);
        }
    }

    pub fn extend(&mut self, effects: impl IntoIterator<Item = Effect>) {
        for e in effects {
            self.push(e);
        }
    }

    /// Markers, list and detail panel.
    pub fn render_all(&mut self) {
        self.extend([Effect::RenderMarkers, Effect::RenderList, Effect::RenderDetail]);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.0.iter()
    }

    pub fn contains(&self, effect: &Effect) -> bool {
        self.0.contains(effect)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<Effect> {
        self.0
    }
}

impl IntoIterator for Effects {
    type Item = Effect;
    type IntoIter = std::vec::IntoIter<Effect>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

fn exceeded(start: Position, at: Position, threshold: f64) -> bool {
    (at.x - start.x).abs() > threshold || (at.y - start.y).abs() > threshold
}

fn two_finger(touches: &[Position]) -> Option<(Position, f64)> {
    match touches {
        [a, b, ..] => Some((a.midpoint(*b), a.distance(*b))),
        _ => None,
    }
}

impl<C: Catalog> Session<C> {
    /// Feed one input event through the state machine.
    pub fn handle(&mut self, event: InteractionEvent) -> Effects {
        let mut fx = Effects::new();
        match event {
            InteractionEvent::PointerDown { at, button } => {
                self.pointer_down(at, button, DRAG_THRESHOLD, &mut fx)
            }
            InteractionEvent::PointerMove { at } => self.pointer_move(at, &mut fx),
            InteractionEvent::PointerUp { .. } => self.finish_gesture(true, &mut fx),
            InteractionEvent::PointerLeave => self.finish_gesture(false, &mut fx),
            InteractionEvent::Wheel { at, delta_y } => {
                if delta_y != 0.0 {
                    self.current_mut().viewport.wheel(delta_y, at);
                    fx.extend([Effect::ApplyTransform, Effect::RenderMarkers, Effect::Persist]);
                }
            }
            InteractionEvent::ContextMenu { at } => self.context_menu(at, &mut fx),
            InteractionEvent::TouchStart { touches } => self.touch_start(&touches, &mut fx),
            InteractionEvent::TouchMove { touches } => self.touch_move(&touches, &mut fx),
            InteractionEvent::TouchEnd { remaining } => self.touch_end(&remaining, &mut fx),
            InteractionEvent::TouchCancel => self.finish_gesture(false, &mut fx),
            InteractionEvent::Escape => self.escape(&mut fx),
        }
        fx
    }

    fn pointer_down(
        &mut self,
        at: Position,
        button: PointerButton,
        threshold: f64,
        fx: &mut Effects,
    ) {
        match (&self.mode, button) {
            (Mode::Idle | Mode::Placing(_), PointerButton::Middle) => {
                let resume = self.mode.placing_id().map(str::to_string);
                self.mode = Mode::Panning {
                    gesture: PanGesture::Drag {
                        start: at,
                        origin: self.current().viewport.pan(),
                        threshold: 0.0,
                        moved: false,
                        click: false,
                    },
                    resume,
                };
            }
            (Mode::Idle, PointerButton::Primary) => {
                if let Some(id) = self.marker_layer().hit_test(at).map(|m| m.id.clone()) {
                    self.begin_drag(id, at, fx);
                } else {
                    self.begin_pan(at, threshold, None);
                }
            }
            (Mode::Placing(id), PointerButton::Primary) => {
                // Pressing on an existing pin never commits a placement.
                if self.marker_layer().hit_test(at).is_none() {
                    let resume = Some(id.clone());
                    self.begin_pan(at, threshold, resume);
                }
            }
            _ => {}
        }
    }

    fn begin_pan(&mut self, at: Position, threshold: f64, resume: Option<EntityId>) {
        self.mode = Mode::Panning {
            gesture: PanGesture::Drag {
                start: at,
                origin: self.current().viewport.pan(),
                threshold,
                moved: false,
                click: true,
            },
            resume,
        };
    }

    fn begin_drag(&mut self, id: EntityId, at: Position, fx: &mut Effects) {
        let city = self.current();
        let Some(stored) = city.placements.get(&id) else {
            return;
        };
        let pointer = city.viewport.to_content(at);
        self.mode = Mode::Dragging {
            grab_offset: pointer.offset_from(stored),
            id: id.clone(),
        };
        fx.extend(self.select(&id));
    }

    fn pointer_move(&mut self, at: Position, fx: &mut Effects) {
        match &mut self.mode {
            Mode::Dragging { id, grab_offset } => {
                let (id, offset) = (id.clone(), *grab_offset);
                let city = self.current_mut();
                let pointer = city.viewport.to_content(at);
                city.placements.upsert(id, pointer.offset_from(offset));
                fx.push(Effect::RenderMarkers);
            }
            Mode::Panning {
                gesture:
                    PanGesture::Drag {
                        start,
                        origin,
                        threshold,
                        moved,
                        ..
                    },
                ..
            } => {
                if !*moved && exceeded(*start, at, *threshold) {
                    *moved = true;
                }
                if *moved {
                    let pan = Position::new(origin.x + at.x - start.x, origin.y + at.y - start.y);
                    self.current_mut().viewport.set_pan(pan);
                    fx.push(Effect::ApplyTransform);
                }
            }
            _ => {}
        }
    }

    /// End a drag or pan. `allow_click` lets an unmoved press commit a
    /// pending placement.
    pub(crate) fn finish_gesture(&mut self, allow_click: bool, fx: &mut Effects) {
        let mode = std::mem::replace(&mut self.mode, Mode::Idle);
        match mode {
            Mode::Dragging { id, .. } => {
                tracing::debug!(id = %id, "drag finished");
                fx.extend([Effect::Persist, Effect::RenderMarkers, Effect::RenderList]);
                if self.selected.as_deref() == Some(id.as_str()) {
                    fx.push(Effect::RenderDetail);
                }
            }
            Mode::Panning { gesture, resume } => {
                self.mode = resume.clone().map(Mode::Placing).unwrap_or(Mode::Idle);
                match gesture {
                    PanGesture::Drag {
                        start,
                        moved,
                        click,
                        ..
                    } => {
                        if moved {
                            fx.push(Effect::Persist);
                        } else if click && allow_click {
                            if let Some(id) = resume {
                                let content = self.current().viewport.to_content(start);
                                fx.extend(self.commit_placement(id, content));
                            }
                        }
                    }
                    PanGesture::Pinch { .. } => fx.push(Effect::Persist),
                }
            }
            other => self.mode = other,
        }
    }

    fn context_menu(&mut self, at: Position, fx: &mut Effects) {
        if self.mode.is_panning() {
            return;
        }
        if let Some(id) = self.marker_layer().hit_test(at).map(|m| m.id.clone()) {
            fx.extend(self.select(&id));
            fx.push(Effect::ShowContextMenu { id, at });
        }
    }

    fn touch_start(&mut self, touches: &[Position], fx: &mut Effects) {
        if let Some((_, distance)) = two_finger(touches) {
            // A second finger turns any gesture into a pinch.
            let resume = self.mode.pending_placement().map(str::to_string);
            if matches!(self.mode, Mode::Dragging { .. } | Mode::Panning { .. }) {
                self.finish_gesture(false, fx);
            }
            self.mode = Mode::Panning {
                gesture: PanGesture::Pinch {
                    last_distance: distance,
                },
                resume,
            };
        } else if let [only] = touches {
            self.pointer_down(*only, PointerButton::Primary, TOUCH_DRAG_THRESHOLD, fx);
        }
    }

    fn touch_move(&mut self, touches: &[Position], fx: &mut Effects) {
        if let Mode::Panning {
            gesture: PanGesture::Pinch { last_distance },
            ..
        } = &mut self.mode
        {
            let Some((mid, distance)) = two_finger(touches) else {
                return;
            };
            if *last_distance < 1.0 {
                *last_distance = distance;
                return;
            }
            let ratio = distance / *last_distance;
            *last_distance = distance;
            self.current_mut().viewport.pinch(ratio, mid);
            fx.extend([Effect::ApplyTransform, Effect::RenderMarkers]);
        } else if let [only] = touches {
            self.pointer_move(*only, fx);
        }
    }

    fn touch_end(&mut self, remaining: &[Position], fx: &mut Effects) {
        // A pinch ends only once every finger has lifted.
        if remaining.is_empty() {
            self.finish_gesture(true, fx);
        }
    }

    fn escape(&mut self, fx: &mut Effects) {
        match &mut self.mode {
            Mode::Placing(_) => {
                self.mode = Mode::Idle;
                fx.push(Effect::RenderMarkers);
            }
            Mode::Panning { resume, .. } if resume.is_some() => {
                *resume = None;
                fx.push(Effect::RenderMarkers);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::models::{test_site, Size};

    fn session() -> Session<StaticCatalog> {
        let catalog = StaticCatalog::new(vec![
            test_site("S1", "Gangnam", 40.0, 20.0),
            test_site("S2", "Gangnam", 10.0, 10.0),
        ]);
        let mut s = Session::new(catalog, City::defaults());
        s.set_viewport_size(Size::new(800.0, 600.0));
        s
    }

    fn down(x: f64, y: f64) -> InteractionEvent {
        InteractionEvent::PointerDown {
            at: Position::new(x, y),
            button: PointerButton::Primary,
        }
    }

    fn mv(x: f64, y: f64) -> InteractionEvent {
        InteractionEvent::PointerMove {
            at: Position::new(x, y),
        }
    }

    fn up(x: f64, y: f64) -> InteractionEvent {
        InteractionEvent::PointerUp {
            at: Position::new(x, y),
        }
    }

    #[test]
    fn test_click_commits_pending_placement() {
        let mut s = session();
        s.start_placing("S1");
        s.handle(down(200.0, 150.0));
        let fx = s.handle(up(200.0, 150.0));
        assert_eq!(s.mode(), &Mode::Idle);
        assert_eq!(
            s.current().placements.get("S1"),
            Some(Position::new(200.0, 150.0))
        );
        assert!(fx.contains(&Effect::Persist));
        assert!(fx.contains(&Effect::Notify(Notice::Placed)));
        assert_eq!(s.selected(), Some("S1"));
    }

    #[test]
    fn test_click_uses_current_transform() {
        let mut s = session();
        s.current_mut().viewport.pan_x = 100.0;
        s.current_mut().viewport.pan_y = 50.0;
        s.current_mut().viewport.zoom = 2.0;
        s.start_placing("S1");
        s.handle(down(300.0, 250.0));
        s.handle(up(300.0, 250.0));
        assert_eq!(
            s.current().placements.get("S1"),
            Some(Position::new(100.0, 100.0))
        );
    }

    #[test]
    fn test_escape_cancels_without_commit() {
        let mut s = session();
        s.start_placing("S1");
        s.handle(InteractionEvent::Escape);
        assert_eq!(s.mode(), &Mode::Idle);
        s.handle(down(10.0, 10.0));
        s.handle(up(10.0, 10.0));
        assert!(s.current().placements.is_empty());
    }

    #[test]
    fn test_leaving_viewport_never_commits() {
        let mut s = session();
        s.start_placing("S1");
        s.handle(down(10.0, 10.0));
        s.handle(InteractionEvent::PointerLeave);
        assert_eq!(s.mode().placing_id(), Some("S1"));
        assert!(s.current().placements.is_empty());
    }

    #[test]
    fn test_new_placing_replaces_previous() {
        let mut s = session();
        s.start_placing("S1");
        s.start_placing("S2");
        assert_eq!(s.mode().placing_id(), Some("S2"));
        s.handle(down(10.0, 10.0));
        s.handle(up(10.0, 10.0));
        assert!(s.current().placements.get("S1").is_none());
        assert!(s.current().placements.get("S2").is_some());
    }

    #[test]
    fn test_pan_while_placing_keeps_pending_placement() {
        let mut s = session();
        s.start_placing("S1");
        s.handle(down(100.0, 100.0));
        s.handle(mv(160.0, 130.0));
        assert!(s.mode().is_panning());
        assert_eq!(s.mode().placing_id(), None);
        let fx = s.handle(up(160.0, 130.0));
        assert!(fx.contains(&Effect::Persist));
        assert_eq!(s.mode().placing_id(), Some("S1"));
        assert!(s.current().placements.is_empty());
        assert_eq!(s.current().viewport.pan(), Position::new(60.0, 30.0));
    }

    #[test]
    fn test_drag_scenario_preserves_grab_offset() {
        let mut s = session();
        s.current_mut()
            .placements
            .upsert("S1", Position::new(50.0, 50.0));
        s.handle(down(55.0, 55.0));
        match s.mode() {
            Mode::Dragging { id, grab_offset } => {
                assert_eq!(id, "S1");
                assert_eq!(*grab_offset, Position::new(5.0, 5.0));
            }
            other => panic!("expected drag, got {other:?}"),
        }
        let fx = s.handle(mv(80.0, 80.0));
        assert!(fx.contains(&Effect::RenderMarkers));
        assert!(!fx.contains(&Effect::Persist));
        assert_eq!(
            s.current().placements.get("S1"),
            Some(Position::new(75.0, 75.0))
        );
        let fx = s.handle(up(80.0, 80.0));
        assert!(fx.contains(&Effect::Persist));
        assert!(fx.contains(&Effect::RenderDetail));
        assert_eq!(s.mode(), &Mode::Idle);
    }

    #[test]
    fn test_drag_under_zoom() {
        let mut s = session();
        s.current_mut().viewport.zoom = 2.0;
        s.current_mut()
            .placements
            .upsert("S1", Position::new(50.0, 50.0));
        // Pin is drawn centered on screen (100, 100).
        s.handle(down(104.0, 106.0));
        s.handle(mv(204.0, 106.0));
        assert_eq!(
            s.current().placements.get("S1"),
            Some(Position::new(100.0, 50.0))
        );
    }

    #[test]
    fn test_repeated_moves_are_idempotent() {
        let mut s = session();
        s.current_mut()
            .placements
            .upsert("S1", Position::new(0.0, 0.0));
        s.handle(down(2.0, 2.0));
        s.handle(mv(30.0, 40.0));
        s.handle(mv(30.0, 40.0));
        assert_eq!(
            s.current().placements.get("S1"),
            Some(Position::new(28.0, 38.0))
        );
    }

    #[test]
    fn test_empty_area_drag_pans_from_gesture_start() {
        let mut s = session();
        s.handle(down(400.0, 300.0));
        s.handle(mv(401.0, 301.0));
        assert_eq!(s.current().viewport.pan(), Position::ORIGIN);
        s.handle(mv(450.0, 280.0));
        s.handle(mv(450.0, 280.0));
        assert_eq!(s.current().viewport.pan(), Position::new(50.0, -20.0));
        s.handle(up(450.0, 280.0));
        assert_eq!(s.mode(), &Mode::Idle);
    }

    #[test]
    fn test_middle_button_pans_over_marker() {
        let mut s = session();
        s.current_mut()
            .placements
            .upsert("S1", Position::new(0.0, 0.0));
        s.handle(InteractionEvent::PointerDown {
            at: Position::new(5.0, 5.0),
            button: PointerButton::Middle,
        });
        s.handle(mv(7.0, 5.0));
        assert_eq!(s.current().viewport.pan(), Position::new(2.0, 0.0));
        assert_eq!(s.current().placements.get("S1"), Some(Position::ORIGIN));
    }

    #[test]
    fn test_pointer_down_on_marker_while_placing_does_nothing() {
        let mut s = session();
        s.current_mut()
            .placements
            .upsert("S2", Position::new(0.0, 0.0));
        s.start_placing("S1");
        s.handle(down(5.0, 5.0));
        s.handle(up(5.0, 5.0));
        assert_eq!(s.mode().placing_id(), Some("S1"));
        assert!(s.current().placements.get("S1").is_none());
    }

    #[test]
    fn test_wheel_zooms_at_pointer_and_persists() {
        let mut s = session();
        let at = Position::new(200.0, 100.0);
        let before = s.current().viewport.to_content(at);
        let fx = s.handle(InteractionEvent::Wheel { at, delta_y: -1.0 });
        assert!((s.current().viewport.zoom - 1.11).abs() < 1e-12);
        let after = s.current().viewport.to_content(at);
        assert!((before.x - after.x).abs() < 1e-9);
        assert!(fx.contains(&Effect::ApplyTransform));
        assert!(fx.contains(&Effect::RenderMarkers));
    }

    #[test]
    fn test_pinch_uses_frame_to_frame_ratio() {
        let mut s = session();
        s.handle(InteractionEvent::TouchStart {
            touches: vec![Position::new(100.0, 100.0), Position::new(200.0, 100.0)],
        });
        s.handle(InteractionEvent::TouchMove {
            touches: vec![Position::new(50.0, 100.0), Position::new(250.0, 100.0)],
        });
        assert!((s.current().viewport.zoom - 2.0).abs() < 1e-12);
        s.handle(InteractionEvent::TouchMove {
            touches: vec![Position::new(0.0, 100.0), Position::new(300.0, 100.0)],
        });
        assert!((s.current().viewport.zoom - 3.0).abs() < 1e-12);
        // One finger up: pinch continues.
        s.handle(InteractionEvent::TouchEnd {
            remaining: vec![Position::new(0.0, 100.0)],
        });
        assert!(s.mode().is_panning());
        let fx = s.handle(InteractionEvent::TouchEnd { remaining: vec![] });
        assert!(fx.contains(&Effect::Persist));
        assert_eq!(s.mode(), &Mode::Idle);
    }

    #[test]
    fn test_tap_commits_placement_and_small_jitter_is_still_a_tap() {
        let mut s = session();
        s.start_placing("S1");
        s.handle(InteractionEvent::TouchStart {
            touches: vec![Position::new(120.0, 80.0)],
        });
        s.handle(InteractionEvent::TouchMove {
            touches: vec![Position::new(125.0, 84.0)],
        });
        s.handle(InteractionEvent::TouchEnd { remaining: vec![] });
        assert_eq!(
            s.current().placements.get("S1"),
            Some(Position::new(120.0, 80.0))
        );
    }

    #[test]
    fn test_second_finger_ends_drag_and_persists() {
        let mut s = session();
        s.current_mut()
            .placements
            .upsert("S1", Position::new(0.0, 0.0));
        s.handle(InteractionEvent::TouchStart {
            touches: vec![Position::new(5.0, 5.0)],
        });
        assert_eq!(s.mode().dragging_id(), Some("S1"));
        let fx = s.handle(InteractionEvent::TouchStart {
            touches: vec![Position::new(5.0, 5.0), Position::new(100.0, 5.0)],
        });
        assert!(fx.contains(&Effect::Persist));
        assert!(s.mode().is_panning());
    }

    #[test]
    fn test_context_menu_selects_marker() {
        let mut s = session();
        s.current_mut()
            .placements
            .upsert("S2", Position::new(10.0, 10.0));
        let at = Position::new(12.0, 12.0);
        let fx = s.handle(InteractionEvent::ContextMenu { at });
        assert_eq!(s.selected(), Some("S2"));
        assert!(fx.contains(&Effect::ShowContextMenu {
            id: "S2".to_string(),
            at
        }));
        let fx = s.handle(InteractionEvent::ContextMenu {
            at: Position::new(700.0, 500.0),
        });
        assert!(fx.is_empty());
    }

    #[test]
    fn test_only_one_active_mode() {
        let mut s = session();
        s.current_mut()
            .placements
            .upsert("S2", Position::new(0.0, 0.0));
        s.handle(down(5.0, 5.0));
        assert!(s.mode().dragging_id().is_some());
        // Starting a placement mid-drag ends the drag first.
        let fx = s.start_placing("S1");
        assert!(fx.contains(&Effect::Persist));
        assert_eq!(s.mode().placing_id(), Some("S1"));
        assert!(s.mode().dragging_id().is_none());
    }
}
