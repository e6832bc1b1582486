// Grid layout engine - Placement, drag, resize and nudge on the fixed grid
use crate::domain::catalog::default_size;
use crate::domain::component::{CanvasComponent, ComponentProps, ComponentType, DataBinding};
use crate::domain::geometry::{Direction, GridPoint, GridRect, GridSize, GridSpec};
use serde::{Deserialize, Serialize};

pub type ComponentId = String;

/// What happens when a committed move or resize lands on another component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Free placement: overlaps stay where they are dropped
    #[default]
    Allow,
    /// The component snaps back to where it was before the edit
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Move,
    Resize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    Committed,
    Reverted,
    /// No gesture was in progress
    Ignored,
}

#[derive(Debug, Clone)]
struct Gesture {
    id: ComponentId,
    kind: GestureKind,
    start: GridRect,
}

/// Owns the components of one open dashboard.
///
/// Every operation is synchronous and clamps instead of failing; unknown ids are no-ops.
#[derive(Debug, Clone)]
pub struct GridEngine {
    spec: GridSpec,
    policy: OverlapPolicy,
    components: Vec<CanvasComponent>,
    selected: Option<ComponentId>,
    gesture: Option<Gesture>,
    next_seq: u64,
}

impl GridEngine {
    pub fn new(spec: GridSpec, policy: OverlapPolicy) -> Self {
        Self {
            spec,
            policy,
            components: Vec::new(),
            selected: None,
            gesture: None,
            next_seq: 1,
        }
    }

    /// Adopt loaded components, pulling each back onto the grid and renaming duplicate ids
    pub fn from_components(spec: GridSpec, policy: OverlapPolicy, components: Vec<CanvasComponent>) -> Self {
        let mut engine = Self::new(spec, policy);
        engine.next_seq = components.len() as u64 + 1;
        for mut component in components {
            let size = spec.clamp_size(component.size);
            let position = spec.clamp_position(
                i64::from(component.position.x),
                i64::from(component.position.y),
                size,
            );
            if size != component.size || position != component.position {
                tracing::warn!("Component {} was outside the grid, clamped into bounds", component.id);
            }
            component.size = size;
            component.position = position;

            if component.id.trim().is_empty() || engine.index_of(&component.id).is_some() {
                let fresh = engine.fresh_id(component.component_type());
                tracing::warn!("Component id '{}' is not unique, renamed to {}", component.id, fresh);
                component.id = fresh;
            }
            engine.components.push(component);
        }
        engine
    }

    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    pub fn policy(&self) -> OverlapPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: OverlapPolicy) {
        self.policy = policy;
    }

    pub fn components(&self) -> &[CanvasComponent] {
        &self.components
    }

    pub fn into_components(self) -> Vec<CanvasComponent> {
        self.components
    }

    pub fn get(&self, id: &str) -> Option<&CanvasComponent> {
        self.components.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Place a new component of `component_type` at its catalog size and select it.
    ///
    /// Returns `None` only under [`OverlapPolicy::Reject`] when no free spot fits.
    pub fn add_component(&mut self, component_type: ComponentType) -> Option<ComponentId> {
        let size = self.spec.clamp_size(default_size(component_type));
        let position = self.place(size)?;
        let id = self.fresh_id(component_type);
        self.components
            .push(CanvasComponent::new(&id, component_type, position, size));
        self.selected = Some(id.clone());
        tracing::debug!("Added {} at ({}, {})", id, position.x, position.y);
        Some(id)
    }

    /// First free `width × height` spot in row-major order, or the origin when the grid is full
    pub fn find_free_position(&self, width: u32, height: u32) -> GridPoint {
        let size = self.spec.clamp_size(GridSize::new(width, height));
        self.free_position(size, None).unwrap_or(GridPoint::ORIGIN)
    }

    /// Move by a pointer delta in pixels
    pub fn move_component(&mut self, id: &str, dx_px: f64, dy_px: f64) -> bool {
        let (dx, dy) = self.spec.pixels_to_cells(dx_px, dy_px);
        self.shift(id, dx, dy)
    }

    /// Resize from the fixed top-left corner
    pub fn resize(&mut self, id: &str, width: i64, height: i64) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let before = self.components[index].rect();
        self.components[index].size = self.spec.clamp_size_at(before.origin, width, height);
        self.commit(index, before)
    }

    /// Move exactly one cell
    pub fn nudge(&mut self, id: &str, direction: Direction) -> bool {
        let (dx, dy) = direction.delta();
        self.shift(id, dx, dy)
    }

    pub fn nudge_selected(&mut self, direction: Direction) -> bool {
        match self.selected.clone() {
            Some(id) => self.nudge(&id, direction),
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<CanvasComponent> {
        let index = self.index_of(id)?;
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        if self.gesture.as_ref().is_some_and(|g| g.id == id) {
            self.gesture = None;
        }
        tracing::debug!("Removed {}", id);
        Some(self.components.remove(index))
    }

    pub fn select(&mut self, id: &str) -> bool {
        if self.index_of(id).is_none() {
            return false;
        }
        self.selected = Some(id.to_string());
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&CanvasComponent> {
        self.selected.as_deref().and_then(|id| self.get(id))
    }

    /// Start a drag or resize; only one gesture runs at a time
    pub fn begin_gesture(&mut self, id: &str, kind: GestureKind) -> bool {
        let Some(component) = self.get(id) else {
            return false;
        };
        let start = component.rect();
        if let Some(previous) = self.gesture.take() {
            tracing::debug!("Abandoning unfinished gesture on {}", previous.id);
        }
        self.gesture = Some(Gesture {
            id: id.to_string(),
            kind,
            start,
        });
        self.selected = Some(id.to_string());
        true
    }

    /// Apply the total pointer delta since the gesture began. Overlap is allowed mid-gesture.
    pub fn update_gesture(&mut self, total_dx_px: f64, total_dy_px: f64) -> Option<GridRect> {
        let gesture = self.gesture.as_ref()?;
        let index = self.index_of(&gesture.id)?;
        let (dx, dy) = self.spec.pixels_to_cells(total_dx_px, total_dy_px);
        let start = gesture.start;

        let component = &mut self.components[index];
        match gesture.kind {
            GestureKind::Move => {
                component.position = self.spec.clamp_position(
                    i64::from(start.origin.x).saturating_add(dx),
                    i64::from(start.origin.y).saturating_add(dy),
                    start.size,
                );
            }
            GestureKind::Resize => {
                component.size = self.spec.clamp_size_at(
                    start.origin,
                    i64::from(start.size.width).saturating_add(dx),
                    i64::from(start.size.height).saturating_add(dy),
                );
            }
        }
        Some(component.rect())
    }

    /// Drop: the overlap policy applies here
    pub fn end_gesture(&mut self) -> DropOutcome {
        let Some(gesture) = self.gesture.take() else {
            return DropOutcome::Ignored;
        };
        let Some(index) = self.index_of(&gesture.id) else {
            return DropOutcome::Ignored;
        };
        if self.commit(index, gesture.start) {
            DropOutcome::Committed
        } else {
            DropOutcome::Reverted
        }
    }

    /// Abort the gesture and restore the starting geometry
    pub fn cancel_gesture(&mut self) {
        let Some(gesture) = self.gesture.take() else {
            return;
        };
        if let Some(index) = self.index_of(&gesture.id) {
            self.restore(index, gesture.start);
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.is_some()
    }

    /// Copy a component, with its props and binding, into the next free spot
    pub fn duplicate(&mut self, id: &str) -> Option<ComponentId> {
        let source = self.get(id)?.clone();
        let position = self.place(source.size)?;
        let copy_id = self.fresh_id(source.component_type());
        let copy = CanvasComponent {
            id: copy_id.clone(),
            position,
            ..source
        };
        self.components.push(copy);
        self.selected = Some(copy_id.clone());
        Some(copy_id)
    }

    /// Replace props; a props variant of another type changes the component's type
    pub fn update_props(&mut self, id: &str, props: ComponentProps) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        self.components[index].props = props;
        true
    }

    pub fn bind(&mut self, id: &str, binding: Option<DataBinding>) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        self.components[index].data_source = binding;
        true
    }

    /// Ids of components overlapping `id`
    pub fn collisions(&self, id: &str) -> Vec<&str> {
        let Some(component) = self.get(id) else {
            return Vec::new();
        };
        let rect = component.rect();
        self.components
            .iter()
            .filter(|c| c.id != id && c.rect().overlaps(&rect))
            .map(|c| c.id.as_str())
            .collect()
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.components.iter().position(|c| c.id == id)
    }

    fn shift(&mut self, id: &str, dx: i64, dy: i64) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let before = self.components[index].rect();
        self.components[index].position = self.spec.clamp_position(
            i64::from(before.origin.x).saturating_add(dx),
            i64::from(before.origin.y).saturating_add(dy),
            before.size,
        );
        self.commit(index, before)
    }

    /// Keep the new geometry unless the policy rejects an overlap
    fn commit(&mut self, index: usize, before: GridRect) -> bool {
        let component = &self.components[index];
        if self.policy == OverlapPolicy::Reject && self.overlaps_others(&component.rect(), Some(&component.id)) {
            tracing::debug!("Rejected overlapping placement of {}", component.id);
            self.restore(index, before);
            return false;
        }
        true
    }

    fn restore(&mut self, index: usize, rect: GridRect) {
        let component = &mut self.components[index];
        component.position = rect.origin;
        component.size = rect.size;
    }

    fn place(&self, size: GridSize) -> Option<GridPoint> {
        match (self.free_position(size, None), self.policy) {
            (Some(position), _) => Some(position),
            (None, OverlapPolicy::Allow) => Some(GridPoint::ORIGIN),
            (None, OverlapPolicy::Reject) => {
                tracing::warn!("No free {}x{} spot left on the grid", size.width, size.height);
                None
            }
        }
    }

    fn free_position(&self, size: GridSize, except: Option<&str>) -> Option<GridPoint> {
        if size.width > self.spec.cols || size.height > self.spec.rows {
            return None;
        }
        for y in 0..=(self.spec.rows - size.height) {
            for x in 0..=(self.spec.cols - size.width) {
                let candidate = GridRect::new(GridPoint::new(x, y), size);
                if !self.overlaps_others(&candidate, except) {
                    return Some(candidate.origin);
                }
            }
        }
        None
    }

    fn overlaps_others(&self, rect: &GridRect, except: Option<&str>) -> bool {
        self.components
            .iter()
            .filter(|c| Some(c.id.as_str()) != except)
            .any(|c| c.rect().overlaps(rect))
    }

    fn fresh_id(&mut self, component_type: ComponentType) -> ComponentId {
        loop {
            let id = format!("{}-{}", component_type.tag(), self.next_seq);
            self.next_seq += 1;
            if self.index_of(&id).is_none() {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::component::ValueProps;
    use crate::domain::query::MetricsQuery;

    fn engine() -> GridEngine {
        GridEngine::new(GridSpec::new(12, 16), OverlapPolicy::Allow)
    }

    fn assert_on_grid(engine: &GridEngine) {
        let spec = engine.spec();
        for c in engine.components() {
            assert!(c.size.width >= 1 && c.size.height >= 1, "{} shrank to nothing", c.id);
            assert!(c.position.x + c.size.width <= spec.cols, "{} overflows columns", c.id);
            assert!(c.position.y + c.size.height <= spec.rows, "{} overflows rows", c.id);
        }
    }

    #[test]
    fn test_add_places_row_major() {
        let mut engine = engine();
        let a = engine.add_component(ComponentType::Value).unwrap();
        let b = engine.add_component(ComponentType::Value).unwrap();
        let c = engine.add_component(ComponentType::BarChart).unwrap();

        assert_eq!(engine.get(&a).unwrap().position, GridPoint::new(0, 0));
        assert_eq!(engine.get(&b).unwrap().position, GridPoint::new(3, 0));
        assert_eq!(engine.get(&c).unwrap().position, GridPoint::new(6, 0));
        assert_eq!(engine.get(&c).unwrap().size, GridSize::new(6, 4));
        assert_eq!(engine.selected().unwrap().id, c);
        assert_ne!(a, b);
    }

    #[test]
    fn test_find_free_position_when_full() {
        let mut engine = GridEngine::new(GridSpec::new(4, 2), OverlapPolicy::Allow);
        engine.add_component(ComponentType::Text).unwrap();
        engine.add_component(ComponentType::Text).unwrap();
        assert_eq!(engine.find_free_position(1, 1), GridPoint::ORIGIN);

        let overlaid = engine.add_component(ComponentType::Text).unwrap();
        assert_eq!(engine.get(&overlaid).unwrap().position, GridPoint::ORIGIN);
    }

    #[test]
    fn test_reject_policy_refuses_full_grid() {
        let mut engine = GridEngine::new(GridSpec::new(4, 1), OverlapPolicy::Reject);
        assert!(engine.add_component(ComponentType::Text).is_some());
        assert!(engine.add_component(ComponentType::Text).is_none());
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn test_move_rounds_pixels_and_clamps() {
        let mut engine = engine();
        let id = engine.add_component(ComponentType::Value).unwrap();

        assert!(engine.move_component(&id, 170.0, 65.0));
        assert_eq!(engine.get(&id).unwrap().position, GridPoint::new(2, 1));

        engine.move_component(&id, 10_000.0, 10_000.0);
        assert_eq!(engine.get(&id).unwrap().position, GridPoint::new(9, 14));

        engine.move_component(&id, -10_000.0, -1.0);
        assert_eq!(engine.get(&id).unwrap().position, GridPoint::new(0, 14));
    }

    #[test]
    fn test_resize_clamps_to_bounds_and_minimum() {
        let mut engine = engine();
        let id = engine.add_component(ComponentType::Value).unwrap();
        engine.nudge(&id, Direction::Right);

        engine.resize(&id, 50, 50);
        assert_eq!(engine.get(&id).unwrap().size, GridSize::new(11, 16));

        engine.resize(&id, 0, -3);
        assert_eq!(engine.get(&id).unwrap().size, GridSize::new(1, 1));
    }

    #[test]
    fn test_nudge_selected() {
        let mut engine = engine();
        let id = engine.add_component(ComponentType::Value).unwrap();
        engine.nudge_selected(Direction::Down);
        engine.nudge_selected(Direction::Right);
        engine.nudge_selected(Direction::Up);
        engine.nudge_selected(Direction::Up);
        assert_eq!(engine.get(&id).unwrap().position, GridPoint::new(1, 0));

        engine.clear_selection();
        assert!(!engine.nudge_selected(Direction::Down));
    }

    #[test]
    fn test_unknown_ids_are_noops() {
        let mut engine = engine();
        engine.add_component(ComponentType::Value).unwrap();
        let before = engine.components().to_vec();

        assert!(!engine.move_component("ghost", 80.0, 0.0));
        assert!(!engine.resize("ghost", 2, 2));
        assert!(!engine.nudge("ghost", Direction::Left));
        assert!(!engine.select("ghost"));
        assert!(!engine.begin_gesture("ghost", GestureKind::Move));
        assert!(engine.remove("ghost").is_none());
        assert!(engine.duplicate("ghost").is_none());
        assert_eq!(engine.components(), &before[..]);
    }

    #[test]
    fn test_grid_invariant_after_edit_sequence() {
        let mut engine = engine();
        let ids: Vec<ComponentId> = [ComponentType::Value, ComponentType::LineChart, ComponentType::Table]
            .into_iter()
            .filter_map(|t| engine.add_component(t))
            .collect();

        let deltas = [(-500.0, 30.0), (999.0, -999.0), (41.0, 29.0), (80.0, 60.0), (-81.0, 2000.0)];
        for (step, (dx, dy)) in deltas.iter().enumerate() {
            for id in &ids {
                engine.move_component(id, *dx, *dy);
                engine.resize(id, step as i64 * 5 - 7, 20 - step as i64 * 9);
                engine.nudge(id, Direction::Right);
                assert_on_grid(&engine);
            }
        }

        for id in &ids {
            engine.move_component(id, f64::MAX, f64::MIN);
            engine.resize(id, i64::MAX, i64::MIN);
            assert_on_grid(&engine);

            for (kind, dx, dy) in [
                (GestureKind::Move, f64::INFINITY, f64::NEG_INFINITY),
                (GestureKind::Resize, f64::INFINITY, f64::MAX),
                (GestureKind::Resize, f64::NAN, f64::NEG_INFINITY),
            ] {
                assert!(engine.begin_gesture(id, kind));
                assert!(engine.update_gesture(dx, dy).is_some());
                engine.end_gesture();
                assert_on_grid(&engine);
            }
        }
        let table = engine.get(&ids[2]).unwrap();
        assert_eq!(table.position.x + table.size.width, engine.spec().cols);
    }

    #[test]
    fn test_gesture_preview_then_drop() {
        let mut engine = engine();
        let a = engine.add_component(ComponentType::Value).unwrap();
        let b = engine.add_component(ComponentType::Value).unwrap();

        assert!(engine.begin_gesture(&b, GestureKind::Move));
        let preview = engine.update_gesture(-100.0, 0.0).unwrap();
        assert_eq!(preview.origin, GridPoint::new(2, 0));
        assert_eq!(engine.collisions(&b), vec![a.as_str()]);
        // totals are relative to the gesture start, not the last update
        let preview = engine.update_gesture(-240.0, 0.0).unwrap();
        assert_eq!(preview.origin, GridPoint::new(0, 0));

        assert_eq!(engine.end_gesture(), DropOutcome::Committed);
        assert_eq!(engine.get(&b).unwrap().position, GridPoint::new(0, 0));
        assert_eq!(engine.end_gesture(), DropOutcome::Ignored);
    }

    #[test]
    fn test_reject_policy_reverts_drop() {
        let mut engine = GridEngine::new(GridSpec::default(), OverlapPolicy::Reject);
        let a = engine.add_component(ComponentType::Value).unwrap();
        let b = engine.add_component(ComponentType::Value).unwrap();

        engine.begin_gesture(&b, GestureKind::Move);
        engine.update_gesture(-160.0, 0.0);
        assert_eq!(engine.end_gesture(), DropOutcome::Reverted);
        assert_eq!(engine.get(&b).unwrap().position, GridPoint::new(3, 0));

        assert!(!engine.nudge(&a, Direction::Right));
        assert_eq!(engine.get(&a).unwrap().position, GridPoint::new(0, 0));
        assert!(!engine.resize(&a, 4, 2));
        assert_eq!(engine.get(&a).unwrap().size, GridSize::new(3, 2));
        assert!(engine.nudge(&a, Direction::Down));
    }

    #[test]
    fn test_resize_gesture_and_cancel() {
        let mut engine = engine();
        let id = engine.add_component(ComponentType::Value).unwrap();

        engine.begin_gesture(&id, GestureKind::Resize);
        let preview = engine.update_gesture(160.0, -500.0).unwrap();
        assert_eq!(preview.size, GridSize::new(5, 1));
        engine.cancel_gesture();
        assert_eq!(engine.get(&id).unwrap().size, GridSize::new(3, 2));
        assert!(!engine.is_dragging());
    }

    #[test]
    fn test_duplicate_copies_binding() {
        let mut engine = engine();
        let id = engine.add_component(ComponentType::Value).unwrap();
        engine.bind(&id, Some(DataBinding::metrics(MetricsQuery::for_metric("receita_total"))));

        let copy = engine.duplicate(&id).unwrap();
        assert_ne!(copy, id);
        assert_eq!(engine.get(&copy).unwrap().position, GridPoint::new(3, 0));
        assert_eq!(engine.get(&copy).unwrap().metric_id(), Some("receita_total"));

        // the copy owns its query
        engine.bind(&copy, Some(DataBinding::metrics(MetricsQuery::for_metric("ocorrencias"))));
        assert_eq!(engine.get(&id).unwrap().metric_id(), Some("receita_total"));
    }

    #[test]
    fn test_update_props_and_remove() {
        let mut engine = engine();
        let id = engine.add_component(ComponentType::Value).unwrap();
        let props = ComponentProps::Value(ValueProps {
            title: Some("Receita".to_string()),
            ..Default::default()
        });
        assert!(engine.update_props(&id, props));
        assert_eq!(engine.get(&id).unwrap().props.title(), Some("Receita"));

        assert!(engine.remove(&id).is_some());
        assert!(engine.selected().is_none());
        assert!(engine.is_empty());
    }

    #[test]
    fn test_from_components_normalizes() {
        let components = vec![
            CanvasComponent::new("a", ComponentType::Value, GridPoint::new(11, 15), GridSize::new(3, 2)),
            CanvasComponent::new("a", ComponentType::Text, GridPoint::new(0, 0), GridSize::new(40, 0)),
        ];
        let mut engine = GridEngine::from_components(GridSpec::default(), OverlapPolicy::Allow, components);
        assert_on_grid(&engine);
        assert_eq!(engine.components()[0].position, GridPoint::new(9, 14));
        assert_eq!(engine.components()[1].size, GridSize::new(12, 1));
        assert_ne!(engine.components()[0].id, engine.components()[1].id);

        let fresh = engine.add_component(ComponentType::Value).unwrap();
        assert_eq!(engine.components().iter().filter(|c| c.id == fresh).count(), 1);
    }
}
