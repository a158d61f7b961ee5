use std::cell::RefCell;
use std::rc::Rc;

use hashbrown::HashMap;
use js_sys::{Float32Array, Function, Promise};
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use vizij_elemental_core::{
    CameraFrame, GeometryLoad, GeometryProvider, GeometrySet, MascotFrame, PoolStatus,
    SpawnOptions, Spawner, SpawnerConfig, StaticGeometryProvider, SurfacePoint,
};

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn geometry_from_js(v: &JsValue) -> Option<GeometrySet> {
    if jsvalue_is_undefined_or_null(v) {
        return None;
    }
    swb::from_value(v.clone()).ok()
}

/// Geometry source backed by registered sets plus an optional JS loader.
///
/// The loader is called as `loader(type) -> GeometrySet | null | Promise<GeometrySet | null>`.
/// Promise results land in `settled` and are picked up by the next `poll`.
#[derive(Default)]
struct JsGeometryProvider {
    fixed: StaticGeometryProvider,
    loader: Option<Function>,
    settled: Rc<RefCell<HashMap<String, Option<GeometrySet>>>>,
}

impl JsGeometryProvider {
    fn accept(&self, element_type: &str, value: JsValue) -> GeometryLoad {
        let Some(promise) = value.dyn_ref::<Promise>() else {
            return GeometryLoad::Ready(geometry_from_js(&value));
        };
        let settled = Rc::clone(&self.settled);
        let key = element_type.to_string();
        let on_ok = Closure::once(move |v: JsValue| {
            settled.borrow_mut().insert(key, geometry_from_js(&v));
        });
        let settled = Rc::clone(&self.settled);
        let key = element_type.to_string();
        let on_err = Closure::once(move |_err: JsValue| {
            settled.borrow_mut().insert(key, None);
        });
        let _ = promise.then2(&on_ok, &on_err);
        // one pair per load; released by the JS side once the promise settles
        on_ok.forget();
        on_err.forget();
        GeometryLoad::Pending
    }
}

impl GeometryProvider for JsGeometryProvider {
    fn request(&mut self, element_type: &str) -> GeometryLoad {
        if let ready @ GeometryLoad::Ready(_) = self.fixed.request(element_type) {
            return ready;
        }
        let Some(loader) = self.loader.as_ref() else {
            return GeometryLoad::Pending;
        };
        match loader.call1(&JsValue::UNDEFINED, &JsValue::from_str(element_type)) {
            Ok(value) => self.accept(element_type, value),
            Err(_) => GeometryLoad::Ready(None),
        }
    }

    fn poll(&mut self, element_type: &str) -> GeometryLoad {
        if let ready @ GeometryLoad::Ready(_) = self.fixed.poll(element_type) {
            return ready;
        }
        match self.settled.borrow_mut().remove(element_type) {
            Some(set) => GeometryLoad::Ready(set),
            None => GeometryLoad::Pending,
        }
    }
}

#[wasm_bindgen]
pub struct VizijElemental {
    core: Spawner<JsGeometryProvider>,
}

#[wasm_bindgen]
impl VizijElemental {
    /// Create a spawner. Pass a config object (camelCase `SpawnerConfig`) or undefined/null.
    ///   new VizijElemental({ maxElementsPerType: 12, trailCount: 2 })
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<VizijElemental, JsError> {
        console_error_panic_hook::set_once();

        let cfg: SpawnerConfig = if jsvalue_is_undefined_or_null(&config) {
            SpawnerConfig::default()
        } else {
            swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))?
        };

        Ok(VizijElemental {
            core: Spawner::new(cfg, JsGeometryProvider::default()),
        })
    }

    /// Make geometry for `type` available immediately.
    #[wasm_bindgen(js_name = registerGeometry)]
    pub fn register_geometry(&mut self, element_type: String, set: JsValue) -> Result<(), JsError> {
        let set: GeometrySet = swb::from_value(set)
            .map_err(|e| JsError::new(&format!("registerGeometry parse error: {e}")))?;
        self.core.provider_mut().fixed.register(element_type, set);
        Ok(())
    }

    /// Resolve loads for `type` as failed; the pool becomes unavailable.
    #[wasm_bindgen(js_name = failGeometry)]
    pub fn fail_geometry(&mut self, element_type: String) {
        self.core.provider_mut().fixed.fail(element_type);
    }

    /// Install (or clear, with null) the geometry loader callback.
    #[wasm_bindgen(js_name = setLoader)]
    pub fn set_loader(&mut self, loader: JsValue) {
        self.core.provider_mut().loader = loader.dyn_into::<Function>().ok();
    }

    /// Add or override named landmarks: `{ name: offset }` in mascot-radius units.
    #[wasm_bindgen(js_name = setLandmarks)]
    pub fn set_landmarks(&mut self, landmarks: JsValue) -> Result<(), JsError> {
        let map: std::collections::HashMap<String, f32> = swb::from_value(landmarks)
            .map_err(|e| JsError::new(&format!("setLandmarks parse error: {e}")))?;
        self.core.landmarks_mut().extend(map);
        Ok(())
    }

    /// `{ position: [x,y,z], rotation: [x,y,z,w], scale: [x,y,z], boundingRadius }`
    #[wasm_bindgen(js_name = setMascot)]
    pub fn set_mascot(&mut self, frame: JsValue) -> Result<(), JsError> {
        let frame: MascotFrame = swb::from_value(frame)
            .map_err(|e| JsError::new(&format!("setMascot parse error: {e}")))?;
        self.core.set_mascot(frame);
        Ok(())
    }

    #[wasm_bindgen(js_name = setCamera)]
    pub fn set_camera(&mut self, frame: JsValue) -> Result<(), JsError> {
        let frame: CameraFrame = swb::from_value(frame)
            .map_err(|e| JsError::new(&format!("setCamera parse error: {e}")))?;
        self.core.set_camera(frame);
        Ok(())
    }

    #[wasm_bindgen(js_name = setMascotSurface)]
    pub fn set_mascot_surface(&mut self, points: JsValue) -> Result<(), JsError> {
        let points: Vec<SurfacePoint> = swb::from_value(points)
            .map_err(|e| JsError::new(&format!("setMascotSurface parse error: {e}")))?;
        self.core.set_mascot_surface(points);
        Ok(())
    }

    /// Replace the active batch of `type`. Returns the spawned ids; empty while loading.
    #[wasm_bindgen]
    pub fn spawn(&mut self, element_type: String, options: JsValue) -> Result<Vec<String>, JsError> {
        let options: SpawnOptions = if jsvalue_is_undefined_or_null(&options) {
            SpawnOptions::default()
        } else {
            swb::from_value(options)
                .map_err(|e| JsError::new(&format!("spawn options error: {e}")))?
        };
        let ids = self.core.spawn(&element_type, options);
        Ok(ids.iter().map(|id| id.to_string()).collect())
    }

    /// Fade out (default) or drop the elements of `type`, or of every type when omitted.
    #[wasm_bindgen]
    pub fn despawn(&mut self, element_type: Option<String>, animated: Option<bool>) {
        self.core
            .despawn(element_type.as_deref(), animated.unwrap_or(true));
    }

    #[wasm_bindgen(js_name = despawnAll)]
    pub fn despawn_all(&mut self) {
        self.core.despawn_all();
    }

    #[wasm_bindgen(js_name = triggerExit)]
    pub fn trigger_exit(&mut self, element_type: Option<String>) {
        self.core.trigger_exit(element_type.as_deref());
    }

    /// Step by `dt` seconds with optional host gesture progress. Returns this frame's events.
    #[wasm_bindgen]
    pub fn update(&mut self, dt: f32, progress: Option<f32>) -> Result<JsValue, JsError> {
        let events = self.core.update(dt, progress);
        swb::to_value(events).map_err(|e| JsError::new(&format!("events error: {e}")))
    }

    #[wasm_bindgen(js_name = hasElements)]
    pub fn has_elements(&self, element_type: String) -> bool {
        self.core.has_elements(&element_type)
    }

    /// "ready" | "pending" | "unavailable", or undefined for an unknown type.
    #[wasm_bindgen]
    pub fn status(&self, element_type: String) -> Option<String> {
        self.core.status(&element_type).map(|s| {
            match s {
                PoolStatus::Ready => "ready",
                PoolStatus::Pending => "pending",
                PoolStatus::Unavailable => "unavailable",
            }
            .to_string()
        })
    }

    #[wasm_bindgen(js_name = getStats)]
    pub fn get_stats(&self) -> Result<JsValue, JsError> {
        swb::to_value(&self.core.stats()).map_err(|e| JsError::new(&format!("stats error: {e}")))
    }

    /// Column-major 4x4 matrices of the visible prefix, 16 floats per slot.
    #[wasm_bindgen(js_name = instanceMatrices)]
    pub fn instance_matrices(&self, element_type: String) -> Option<Float32Array> {
        let pool = self.core.pool(&element_type)?;
        let rows = &pool.matrices()[..pool.visible_count()];
        Some(Float32Array::from(bytemuck::cast_slice::<_, f32>(rows)))
    }

    /// Attribute rows of the visible prefix, 12 floats per slot.
    #[wasm_bindgen(js_name = instanceAttributes)]
    pub fn instance_attributes(&self, element_type: String) -> Option<Float32Array> {
        let pool = self.core.pool(&element_type)?;
        let rows = &pool.attributes()[..pool.visible_count()];
        Some(Float32Array::from(bytemuck::cast_slice::<_, f32>(rows)))
    }

    /// Column-major world matrix of the shared container the instance matrices live in.
    #[wasm_bindgen(js_name = containerMatrix)]
    pub fn container_matrix(&self) -> Float32Array {
        Float32Array::from(&self.core.container().to_mat4().to_cols_array()[..])
    }

    #[wasm_bindgen(js_name = visibleCount)]
    pub fn visible_count(&self, element_type: String) -> usize {
        self.core
            .pool(&element_type)
            .map(|p| p.visible_count())
            .unwrap_or(0)
    }

    /// `{ renderOrder, depthWrite, uniforms }` for the type's material.
    #[wasm_bindgen(js_name = renderState)]
    pub fn render_state(&self, element_type: String) -> Result<JsValue, JsError> {
        match self.core.pool(&element_type) {
            Some(pool) => swb::to_value(pool.render_state())
                .map_err(|e| JsError::new(&format!("renderState error: {e}"))),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    #[wasm_bindgen]
    pub fn dispose(&mut self) {
        self.core.dispose();
    }
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
