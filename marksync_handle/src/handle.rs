// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The interactive handle: a representation plus its pointer state machine.

use alloc::boxed::Box;
use alloc::rc::Rc;

use bitflags::bitflags;
use glam::DVec3;
use kurbo::Point;
use marksync_geometry::WorldGeometry;

use crate::{DragState, Hit, HitParams, Interactor, Part, Representation};

bitflags! {
    /// Keyboard modifiers held during a pointer event.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// Shift.
        const SHIFT = 1 << 0;
        /// Control.
        const CONTROL = 1 << 1;
        /// Alt / Option.
        const ALT = 1 << 2;
        /// Meta / Command.
        const META = 1 << 3;
    }
}

bitflags! {
    /// Handle switches.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct HandleFlags: u8 {
        /// The handle is turned on.
        const ENABLED = 1 << 0;
        /// The representation is drawn.
        const VISIBLE = 1 << 1;
        /// Pointer events are processed. Cleared when the node is locked.
        const PROCESS_EVENTS = 1 << 2;
    }
}

impl Default for HandleFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::PROCESS_EVENTS
    }
}

/// Parameters of pointer interaction shared by all handles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InteractionParams {
    /// Picking tolerances.
    pub hit: HitParams,
    /// Holding these modifiers grabs the whole shape whatever part is hit.
    ///
    /// An empty set disables forced translation.
    pub translate_modifier: Modifiers,
}

impl Default for InteractionParams {
    fn default() -> Self {
        Self {
            hit: HitParams::default(),
            translate_modifier: Modifiers::SHIFT,
        }
    }
}

/// Pointer state of a handle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HandleState {
    /// Idle. Moves only update hover feedback.
    #[default]
    Start,
    /// A part is grabbed and follows the pointer.
    Active {
        /// The grabbed part.
        part: Part,
    },
}

/// Notifications emitted by a handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandleEvent {
    /// A part was grabbed.
    StartInteraction,
    /// The grabbed part moved; the representation's geometry changed.
    Interaction,
    /// The grab was released.
    EndInteraction,
    /// The handle was turned on.
    Enabled,
    /// The handle was turned off.
    Disabled,
}

/// A draggable 3D handle.
///
/// The handle owns its [`Representation`] and routes pointer input to it.
/// Every state change that the outside world must react to is returned as a
/// [`HandleEvent`] instead of being broadcast; the caller decides where it
/// goes.
///
/// ```
/// use kurbo::{Point, Size};
/// use marksync_geometry::{BoxCorners, DVec3, WorldGeometry};
/// use marksync_handle::{
///     BoxRepresentation, HandleEvent, InteractionParams, InteractiveHandle, Modifiers,
///     Representation, ViewProjection,
/// };
/// use std::rc::Rc;
///
/// // 1 world unit == 10 px, world origin at the viewport center.
/// let camera = ViewProjection::orthographic(DVec3::ZERO, 10.0, Size::new(200.0, 200.0)).unwrap();
/// let mut rep = BoxRepresentation::new();
/// rep.set_world_geometry(WorldGeometry::Box(BoxCorners::new(DVec3::splat(-1.0), DVec3::ONE)));
///
/// let mut handle = InteractiveHandle::new(Box::new(rep), InteractionParams::default());
/// handle.set_interactor(Some(Rc::new(camera)));
/// handle.set_enabled(true);
///
/// // Grab the center and drag 20 px to the right: 2 world units.
/// let grab = handle.begin_interaction(Point::new(100.0, 100.0), Modifiers::empty());
/// assert_eq!(grab, Some(HandleEvent::StartInteraction));
/// assert_eq!(handle.pointer_move(Point::new(120.0, 100.0)), Some(HandleEvent::Interaction));
/// assert_eq!(handle.end_interaction(), Some(HandleEvent::EndInteraction));
///
/// let bounds = handle.world_geometry().unwrap().bounds().unwrap();
/// assert!((bounds.center().x - 2.0).abs() < 1e-9);
/// ```
#[derive(Debug)]
pub struct InteractiveHandle {
    representation: Box<dyn Representation>,
    interactor: Option<Rc<dyn Interactor>>,
    state: HandleState,
    flags: HandleFlags,
    drag: DragState,
    params: InteractionParams,
}

impl InteractiveHandle {
    /// Creates a disabled, detached handle around `representation`.
    pub fn new(representation: Box<dyn Representation>, params: InteractionParams) -> Self {
        Self {
            representation,
            interactor: None,
            state: HandleState::Start,
            flags: HandleFlags::default(),
            drag: DragState::default(),
            params,
        }
    }

    /// The representation.
    pub fn representation(&self) -> &dyn Representation {
        &*self.representation
    }

    /// Mutable access to the representation.
    pub fn representation_mut(&mut self) -> &mut dyn Representation {
        &mut *self.representation
    }

    /// Current world geometry of the representation.
    pub fn world_geometry(&self) -> Option<WorldGeometry> {
        self.representation.world_geometry()
    }

    /// Replaces the displayed geometry. See [`Representation::set_world_geometry`].
    pub fn set_world_geometry(&mut self, geometry: WorldGeometry) -> bool {
        self.representation.set_world_geometry(geometry)
    }

    /// Current pointer state.
    pub fn state(&self) -> HandleState {
        self.state
    }

    /// Returns `true` while a part is grabbed.
    pub fn is_active(&self) -> bool {
        matches!(self.state, HandleState::Active { .. })
    }

    /// Current switches.
    pub fn flags(&self) -> HandleFlags {
        self.flags
    }

    /// Interaction parameters.
    pub fn params(&self) -> &InteractionParams {
        &self.params
    }

    /// Replaces the interaction parameters.
    pub fn set_params(&mut self, params: InteractionParams) {
        self.params = params;
    }

    /// Returns `true` if the handle is turned on.
    pub fn is_enabled(&self) -> bool {
        self.flags.contains(HandleFlags::ENABLED)
    }

    /// Turns the handle on or off.
    ///
    /// Returns [`HandleEvent::Enabled`] or [`HandleEvent::Disabled`] when the
    /// state actually changes. Disabling an active handle drops the grab
    /// without an [`HandleEvent::EndInteraction`]; every motion was already
    /// reported.
    pub fn set_enabled(&mut self, enabled: bool) -> Option<HandleEvent> {
        if self.is_enabled() == enabled {
            return None;
        }
        self.flags.set(HandleFlags::ENABLED, enabled);
        if enabled {
            Some(HandleEvent::Enabled)
        } else {
            self.release();
            Some(HandleEvent::Disabled)
        }
    }

    /// Shows or hides the representation. Hidden handles are not pickable.
    ///
    /// Hiding an active handle drops the grab, as [`set_enabled`](Self::set_enabled) does.
    pub fn set_visible(&mut self, visible: bool) {
        self.flags.set(HandleFlags::VISIBLE, visible);
        if !visible && self.is_active() {
            self.release();
        }
    }

    /// Enables or disables pointer processing, used to lock a handle.
    ///
    /// Locking an active handle drops the grab; later moves are ignored.
    pub fn set_processes_events(&mut self, process: bool) {
        self.flags.set(HandleFlags::PROCESS_EVENTS, process);
        if !process && self.is_active() {
            self.release();
        }
    }

    /// The attached interactor.
    pub fn interactor(&self) -> Option<&Rc<dyn Interactor>> {
        self.interactor.as_ref()
    }

    /// Attaches the handle to an interactor, or detaches it with `None`.
    ///
    /// An active grab cannot survive a change of viewport; it is ended and
    /// [`HandleEvent::EndInteraction`] is returned.
    pub fn set_interactor(&mut self, interactor: Option<Rc<dyn Interactor>>) -> Option<HandleEvent> {
        let ended = self.end_interaction();
        self.interactor = interactor;
        ended
    }

    /// Detaches the handle from its interactor.
    pub fn detach(&mut self) -> Option<HandleEvent> {
        self.set_interactor(None)
    }

    /// Returns `true` if pointer input would currently be processed.
    pub fn accepts_input(&self) -> bool {
        self.flags.contains(HandleFlags::all())
            && self.interactor.is_some()
            && !self.representation.is_empty()
    }

    /// Finds the part under `position`, if the handle accepts input there.
    pub fn pick(&self, position: Point) -> Option<Hit> {
        if !self.accepts_input() {
            return None;
        }
        let interactor = self.interactor.as_deref()?;
        if !interactor.contains(position) {
            return None;
        }
        self.representation
            .pick(interactor, position, &self.params.hit)
    }

    /// Grabs the part under `position`.
    ///
    /// Returns [`HandleEvent::StartInteraction`] when a part was grabbed and
    /// `None` when the pointer misses the handle, the handle does not accept
    /// input, or a grab is already in progress.
    pub fn begin_interaction(
        &mut self,
        position: Point,
        modifiers: Modifiers,
    ) -> Option<HandleEvent> {
        if self.is_active() {
            return None;
        }
        let hit = self.pick(position)?;
        let translate = self.params.translate_modifier;
        let part = if !translate.is_empty() && modifiers.contains(translate) {
            Part::Body
        } else {
            hit.part
        };
        let anchor = self.representation.anchor(part)?;
        let depth = self.interactor.as_deref()?.world_to_display(anchor)?.z;
        self.drag.start(position, depth);
        self.representation.set_highlight(part);
        self.state = HandleState::Active { part };
        log::trace!("grabbed {part:?} at {position:?}");
        Some(HandleEvent::StartInteraction)
    }

    /// Feeds a pointer move.
    ///
    /// While idle this only updates hover highlighting and returns `None`.
    /// While active it moves the grabbed part and returns
    /// [`HandleEvent::Interaction`], even when the pointer did not move.
    pub fn pointer_move(&mut self, position: Point) -> Option<HandleEvent> {
        let HandleState::Active { part } = self.state else {
            let hover = self.pick(position).map_or(Part::Outside, |hit| hit.part);
            self.representation.set_highlight(hover);
            return None;
        };
        let interactor = self.interactor.as_deref()?;
        let (from, to) = self.drag.update(position)?;
        let depth = self.drag.depth;
        let from = interactor.display_to_world(DVec3::new(from.x, from.y, depth))?;
        let to = interactor.display_to_world(DVec3::new(to.x, to.y, depth))?;
        self.representation.apply_motion(part, to - from);
        Some(HandleEvent::Interaction)
    }

    /// Releases the grab.
    ///
    /// Returns [`HandleEvent::EndInteraction`] if a grab was in progress.
    pub fn end_interaction(&mut self) -> Option<HandleEvent> {
        self.is_active().then(|| {
            self.release();
            HandleEvent::EndInteraction
        })
    }

    fn release(&mut self) {
        self.state = HandleState::Start;
        self.drag.end();
        self.representation.set_highlight(Part::Outside);
    }
}
