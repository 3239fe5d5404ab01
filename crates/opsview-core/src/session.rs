//! In-memory viewer session.
//!
//! The session exclusively owns the parsed collections and the
//! selection/hover/active state of each domain. Collaborators read views and
//! mutate state only through the intent methods below.

use std::collections::BTreeSet;

use geojson::FeatureCollection;
use serde_json::Value;

use crate::derive::{derive_aors, derive_operations, overall_time_range};
use crate::error::ParseError;
use crate::geometry::{bounding_box, Bounds};
use crate::models::{ParsedAor, ParsedOperation, TimeRange};
use crate::normalize::{parse_areas_of_responsibility, parse_operations};
use crate::projector::{aors_to_features, combined_features, operations_to_features};
use crate::style::{zone_paint, ZonePaint};

/// The two independently loaded domains, each rendered as its own layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    Operations,
    Aors,
}

impl Layer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Operations => "operations",
            Layer::Aors => "aors",
        }
    }
}

/// Callback from the map widget, carrying the entity id of the zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapEvent {
    Click { layer: Layer, id: String },
    Hover { layer: Layer, id: String },
    Leave { layer: Layer },
}

/// Render target driven by the session.
pub trait MapView {
    /// Replace the features shown on `layer`.
    fn set_features(&mut self, layer: Layer, features: &FeatureCollection);
    /// Ids to emphasize on `layer`; an empty set means nothing is highlighted.
    fn set_highlight(&mut self, layer: Layer, ids: &BTreeSet<String>);
    fn fit_bounds(&mut self, bounds: Bounds);
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Interaction {
    selected: BTreeSet<String>,
    active: Option<String>,
    hovered: Option<String>,
}

impl Interaction {
    fn highlighted(&self) -> BTreeSet<String> {
        let mut ids = self.selected.clone();
        ids.extend(self.active.iter().cloned());
        ids.extend(self.hovered.iter().cloned());
        ids
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    operations: Vec<ParsedOperation>,
    aors: Vec<ParsedAor>,
    operation_state: Interaction,
    aor_state: Interaction,
    timeframe: Option<TimeRange>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== LOADING ==========

    /// Replace the operation collection with the contents of an upload.
    ///
    /// On failure the previous collection and all state are kept.
    pub fn load_operations(&mut self, raw: &Value) -> Result<usize, ParseError> {
        let operations = derive_operations(parse_operations(raw)?);

        self.timeframe = overall_time_range(&operations);
        self.operation_state = Interaction {
            active: operations.first().map(|op| op.id().to_string()),
            ..Interaction::default()
        };
        self.operations = operations;

        tracing::info!("Loaded {} operations", self.operations.len());
        Ok(self.operations.len())
    }

    /// Replace the AoR collection with the contents of an upload.
    ///
    /// On failure the previous collection and all state are kept.
    pub fn load_aors(&mut self, raw: &Value) -> Result<usize, ParseError> {
        let aors = derive_aors(parse_areas_of_responsibility(raw)?);

        self.aor_state = Interaction::default();
        self.aors = aors;

        tracing::info!("Loaded {} areas of responsibility", self.aors.len());
        Ok(self.aors.len())
    }

    pub fn load_operations_str(&mut self, text: &str) -> Result<usize, ParseError> {
        let raw: Value = serde_json::from_str(text)?;
        self.load_operations(&raw)
    }

    pub fn load_aors_str(&mut self, text: &str) -> Result<usize, ParseError> {
        let raw: Value = serde_json::from_str(text)?;
        self.load_aors(&raw)
    }

    // ========== INTENTS ==========

    /// Make `id` the active entity of `layer`. Unknown ids are ignored.
    pub fn activate(&mut self, layer: Layer, id: &str) -> bool {
        if !self.contains(layer, id) {
            return false;
        }
        self.state_mut(layer).active = Some(id.to_string());
        true
    }

    pub fn deactivate(&mut self, layer: Layer) {
        self.state_mut(layer).active = None;
    }

    /// Flip membership of `id` in the selection. Returns whether it is now
    /// selected; unknown ids are never selected.
    pub fn toggle_select(&mut self, layer: Layer, id: &str) -> bool {
        if !self.contains(layer, id) {
            return false;
        }
        let selected = &mut self.state_mut(layer).selected;
        if selected.remove(id) {
            false
        } else {
            selected.insert(id.to_string());
            true
        }
    }

    pub fn clear_selection(&mut self, layer: Layer) {
        self.state_mut(layer).selected.clear();
    }

    /// Set or clear the hovered entity. Unknown ids clear the hover.
    pub fn hover(&mut self, layer: Layer, id: Option<&str>) {
        let hovered = id
            .filter(|id| self.contains(layer, id))
            .map(str::to_string);
        self.state_mut(layer).hovered = hovered;
    }

    /// Replace the operation timeframe filter; `None` shows everything.
    pub fn set_timeframe(&mut self, timeframe: Option<TimeRange>) {
        self.timeframe = timeframe;
    }

    pub fn handle_map_event(&mut self, event: MapEvent) {
        match event {
            MapEvent::Click { layer, id } => {
                if !self.activate(layer, &id) {
                    tracing::debug!("Ignoring click on unknown {} id {}", layer.as_str(), id);
                }
            }
            MapEvent::Hover { layer, id } => self.hover(layer, Some(&id)),
            MapEvent::Leave { layer } => self.hover(layer, None),
        }
    }

    // ========== VIEWS ==========

    pub fn operations(&self) -> &[ParsedOperation] {
        &self.operations
    }

    pub fn aors(&self) -> &[ParsedAor] {
        &self.aors
    }

    pub fn timeframe(&self) -> Option<TimeRange> {
        self.timeframe
    }

    pub fn active(&self, layer: Layer) -> Option<&str> {
        self.state(layer).active.as_deref()
    }

    pub fn hovered(&self, layer: Layer) -> Option<&str> {
        self.state(layer).hovered.as_deref()
    }

    pub fn selected(&self, layer: Layer) -> &BTreeSet<String> {
        &self.state(layer).selected
    }

    pub fn active_operation(&self) -> Option<&ParsedOperation> {
        let id = self.active(Layer::Operations)?;
        self.operations.iter().find(|op| op.id() == id)
    }

    /// Operations whose window overlaps the timeframe, in upload order.
    pub fn visible_operations(&self) -> Vec<&ParsedOperation> {
        self.operations
            .iter()
            .filter(|op| match &self.timeframe {
                Some(timeframe) => op.time_range().overlaps(timeframe),
                None => true,
            })
            .collect()
    }

    pub fn operations_collection(&self) -> FeatureCollection {
        operations_to_features(self.visible_operations())
    }

    pub fn aors_collection(&self) -> FeatureCollection {
        aors_to_features(&self.aors)
    }

    /// Selected, active and hovered ids of `layer`.
    pub fn highlighted_ids(&self, layer: Layer) -> BTreeSet<String> {
        self.state(layer).highlighted()
    }

    /// Paint for one zone of `layer` under the current highlight set.
    pub fn zone_paint(&self, layer: Layer, id: &str) -> ZonePaint {
        zone_paint(id, &self.highlighted_ids(layer))
    }

    /// Selected operations if any, otherwise the visible ones.
    pub fn export_operations(&self) -> Vec<&ParsedOperation> {
        let selected = &self.operation_state.selected;
        if selected.is_empty() {
            return self.visible_operations();
        }
        self.operations
            .iter()
            .filter(|op| selected.contains(op.id()))
            .collect()
    }

    /// Selected AoRs if any, otherwise all of them.
    pub fn export_aors(&self) -> Vec<&ParsedAor> {
        let selected = &self.aor_state.selected;
        self.aors
            .iter()
            .filter(|aor| selected.is_empty() || selected.contains(aor.id()))
            .collect()
    }

    /// Push both layers, their highlight sets and the combined bounds.
    pub fn render(&self, map: &mut impl MapView) {
        let operations = self.operations_collection();
        let aors = self.aors_collection();

        map.set_features(Layer::Operations, &operations);
        map.set_features(Layer::Aors, &aors);
        map.set_highlight(Layer::Operations, &self.highlighted_ids(Layer::Operations));
        map.set_highlight(Layer::Aors, &self.highlighted_ids(Layer::Aors));

        let mut combined = operations;
        combined.features.extend(aors.features);
        if let Some(bounds) = bounding_box(&combined) {
            map.fit_bounds(bounds);
        }
    }

    /// Every loaded zone, ignoring the timeframe.
    pub fn all_features(&self) -> FeatureCollection {
        combined_features(&self.operations, &self.aors)
    }

    fn contains(&self, layer: Layer, id: &str) -> bool {
        match layer {
            Layer::Operations => self.operations.iter().any(|op| op.id() == id),
            Layer::Aors => self.aors.iter().any(|aor| aor.id() == id),
        }
    }

    fn state(&self, layer: Layer) -> &Interaction {
        match layer {
            Layer::Operations => &self.operation_state,
            Layer::Aors => &self.aor_state,
        }
    }

    fn state_mut(&mut self, layer: Layer) -> &mut Interaction {
        match layer {
            Layer::Operations => &mut self.operation_state,
            Layer::Aors => &mut self.aor_state,
        }
    }
}
