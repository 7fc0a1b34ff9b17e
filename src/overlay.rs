//! Map overlay adapter boundary.
//!
//! The core never talks to a rendering backend directly. It drives the
//! [`MapOverlay`] trait, and [`SceneOverlay`] records the resulting scene
//! in memory so it can be served to a browser map or globe as JSON.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::models::LatLng;

// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerId {
    Blooms,
    Citizen,
    Climate,
    Agriculture,
}

impl LayerId {
    pub const ALL: [LayerId; 4] = [
        LayerId::Blooms,
        LayerId::Citizen,
        LayerId::Climate,
        LayerId::Agriculture,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerStyle {
    pub radius: u32,
    pub fill_color: String,
    pub color: String,
    pub weight: u32,
    pub fill_opacity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MarkerHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub center: LatLng,
    pub zoom: u8,
}

/// Operations the coordinator needs from a map or globe backend.
pub trait MapOverlay {
    fn add_marker(&mut self, layer: LayerId, position: LatLng, style: &MarkerStyle) -> MarkerHandle;
    fn clear_layer(&mut self, layer: LayerId);
    fn set_viewport(&mut self, center: LatLng, zoom: u8);
    fn bind_popup(&mut self, handle: MarkerHandle, html: &str);
    fn set_layer_opacity(&mut self, layer: LayerId, value: f64);
}

#[derive(Debug, Clone, Serialize)]
pub struct SceneMarker {
    pub handle: MarkerHandle,
    pub position: LatLng,
    pub style: MarkerStyle,
    pub popup: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SceneLayer {
    pub opacity: f64,
    pub markers: Vec<SceneMarker>,
}

impl Default for SceneLayer {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            markers: Vec::new(),
        }
    }
}

/// In-memory overlay whose state is the scene a client should draw.
#[derive(Debug, Clone, Serialize)]
pub struct SceneOverlay {
    pub viewport: Viewport,
    pub layers: BTreeMap<LayerId, SceneLayer>,
    #[serde(skip)]
    next_handle: u64,
    /// Live handles to their layer and position in that layer.
    #[serde(skip)]
    index: HashMap<MarkerHandle, (LayerId, usize)>,
}

impl SceneOverlay {
    pub fn new(center: LatLng, zoom: u8) -> Self {
        Self {
            viewport: Viewport { center, zoom },
            layers: BTreeMap::new(),
            next_handle: 0,
            index: HashMap::new(),
        }
    }

    pub fn marker_count(&self, layer: LayerId) -> usize {
        self.layers.get(&layer).map_or(0, |l| l.markers.len())
    }
}

impl MapOverlay for SceneOverlay {
    fn add_marker(
        &mut self,
        layer: LayerId,
        position: LatLng,
        style: &MarkerStyle,
    ) -> MarkerHandle {
        // ---
        self.next_handle += 1;
        let handle = MarkerHandle(self.next_handle);
        let markers = &mut self.layers.entry(layer).or_default().markers;
        self.index.insert(handle, (layer, markers.len()));
        markers.push(SceneMarker {
            handle,
            position,
            style: style.clone(),
            popup: None,
        });
        handle
    }

    fn clear_layer(&mut self, layer: LayerId) {
        if let Some(l) = self.layers.get_mut(&layer) {
            for marker in l.markers.drain(..) {
                self.index.remove(&marker.handle);
            }
        }
    }

    fn set_viewport(&mut self, center: LatLng, zoom: u8) {
        self.viewport = Viewport { center, zoom };
    }

    fn bind_popup(&mut self, handle: MarkerHandle, html: &str) {
        // ---
        let marker = self
            .index
            .get(&handle)
            .and_then(|(layer, pos)| self.layers.get_mut(layer)?.markers.get_mut(*pos));
        match marker {
            Some(m) => m.popup = Some(html.to_string()),
            None => tracing::warn!("bind_popup: unknown marker handle {}", handle.0),
        }
    }

    fn set_layer_opacity(&mut self, layer: LayerId, value: f64) {
        self.layers.entry(layer).or_default().opacity = value.clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn style() -> MarkerStyle {
        MarkerStyle {
            radius: 8,
            fill_color: "#90EE90".to_string(),
            color: "#ffffff".to_string(),
            weight: 1,
            fill_opacity: 0.8,
        }
    }

    #[test]
    fn test_clear_only_touches_one_layer() {
        let mut scene = SceneOverlay::new(LatLng::new(0.0, 0.0), 2);
        scene.add_marker(LayerId::Blooms, LatLng::new(1.0, 1.0), &style());
        scene.add_marker(LayerId::Climate, LatLng::new(2.0, 2.0), &style());

        scene.clear_layer(LayerId::Blooms);

        assert_eq!(scene.marker_count(LayerId::Blooms), 0);
        assert_eq!(scene.marker_count(LayerId::Climate), 1);
    }

    #[test]
    fn test_handles_are_unique_and_popups_bind() {
        let mut scene = SceneOverlay::new(LatLng::new(0.0, 0.0), 2);
        let a = scene.add_marker(LayerId::Blooms, LatLng::new(1.0, 1.0), &style());
        let b = scene.add_marker(LayerId::Citizen, LatLng::new(1.0, 1.0), &style());
        assert_ne!(a, b);

        scene.bind_popup(a, "<b>Lotus</b>");
        let blooms = &scene.layers[&LayerId::Blooms];
        assert_eq!(blooms.markers[0].popup.as_deref(), Some("<b>Lotus</b>"));
        assert!(scene.layers[&LayerId::Citizen].markers[0].popup.is_none());
    }

    #[test]
    fn test_popups_follow_layer_clears() {
        let mut scene = SceneOverlay::new(LatLng::new(0.0, 0.0), 2);
        let stale = scene.add_marker(LayerId::Blooms, LatLng::new(1.0, 1.0), &style());
        let kept = scene.add_marker(LayerId::Climate, LatLng::new(2.0, 2.0), &style());
        scene.clear_layer(LayerId::Blooms);
        let fresh: Vec<_> = (0..3)
            .map(|i| scene.add_marker(LayerId::Blooms, LatLng::new(i as f64, 0.0), &style()))
            .collect();

        scene.bind_popup(stale, "stale");
        scene.bind_popup(kept, "climate");
        scene.bind_popup(fresh[2], "third");

        let blooms = &scene.layers[&LayerId::Blooms].markers;
        assert!(blooms.iter().all(|m| m.popup.as_deref() != Some("stale")));
        assert_eq!(blooms[2].handle, fresh[2]);
        assert_eq!(blooms[2].popup.as_deref(), Some("third"));
        assert!(blooms[0].popup.is_none());
        let climate = &scene.layers[&LayerId::Climate].markers;
        assert_eq!(climate[0].popup.as_deref(), Some("climate"));
    }

    #[test]
    fn test_viewport_and_opacity() {
        let mut scene = SceneOverlay::new(LatLng::new(0.0, 0.0), 2);
        scene.set_viewport(LatLng::new(30.0, 100.0), 3);
        scene.set_layer_opacity(LayerId::Blooms, 1.7);

        assert_eq!(scene.viewport.zoom, 3);
        assert_eq!(scene.layers[&LayerId::Blooms].opacity, 1.0);
    }
}
