//! Scene rendering: per-frame orchestration of the renderer passes for the
//! editor preview and for play mode, plus the lighting, bloom and particle
//! stages they are built from.

pub mod components;
pub mod lighting;
pub mod bloom;
pub mod particles;
mod scene_renderer;
mod runtime_scene_renderer;
mod editor_scene_renderer;

pub use components::{
    CameraComponent, DirectionalLight, EntityId, LightComponent, MaterialAsset, MeshComponent,
    ParticleEmitterComponent, PointLight, SkyboxComponent, Spotlight, Transform,
};
pub use lighting::{DirectionalLightData, LightBuffers, PointLightData, SpotlightData};
pub use bloom::{Bloom, BloomMip};
pub use particles::{ParticleData, ParticleEmitter, ParticleSystem};
pub use scene_renderer::SceneRenderer;
pub use runtime_scene_renderer::RuntimeSceneRenderer;
pub use editor_scene_renderer::{BillboardIcon, EditorIcons, EditorSceneRenderer};
