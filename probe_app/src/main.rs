//! Headless collision demo
//!
//! Drops a handful of spheres onto a floor, sweeps a capsule through them and
//! runs a camera probe every frame, logging overlap events as they happen.
//!
//! Usage: `probe_demo [config.toml|config.ron]`

use collision_engine::foundation::logging;
use collision_engine::physics::collision::Sphere;
use collision_engine::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const FRAMES: usize = 180;
const DT: f32 = 1.0 / 60.0;
const GRAVITY: f32 = -9.8;
const CAMERA_OWNER: OwnerId = OwnerId(1);

/// Listener that logs every notification
struct LoggingListener {
    frame: usize,
    begins: usize,
    ends: usize,
}

impl OverlapListener for LoggingListener {
    fn on_begin_overlap(&mut self, event: &OverlapEvent) {
        self.begins += 1;
        if let Some(contact) = event.contact {
            log::info!(
                "[frame {}] {:?} begins overlapping {:?} (depth {:.3}, normal {:.2?})",
                self.frame,
                event.receiver_owner,
                event.other_owner,
                contact.penetration_depth,
                contact.normal.as_slice()
            );
        }
    }

    fn on_end_overlap(&mut self, event: &OverlapEvent) {
        self.ends += 1;
        log::info!(
            "[frame {}] {:?} stops overlapping {:?}",
            self.frame,
            event.receiver_owner,
            event.other_owner
        );
    }
}

struct Body {
    handle: ColliderHandle,
    velocity: Vec3,
}

fn load_config() -> Result<CollisionConfig, ConfigError> {
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading collision config from {path}");
            CollisionConfig::load_from_file(&path)
        }
        None => Ok(CollisionConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let config = load_config()?;
    let mut visualizer = CollisionDebugVisualizer::new(config.debug.clone());
    let mut manager = CollisionManager::with_config(config)?;
    let mut colliders = ColliderSet::new();
    let mut rng = StdRng::seed_from_u64(2024);

    let floor = colliders.insert(
        Collider::cuboid_at(Vec3::new(0.0, -0.5, 0.0), Vec3::new(20.0, 0.5, 20.0))
            .with_owner(OwnerId(100))
            .with_layers(CollisionLayers::ENVIRONMENT, CollisionLayers::all()),
    );

    let mut bodies = Vec::new();
    for i in 0..12u64 {
        let position = Vec3::new(
            rng.gen_range(-6.0..6.0),
            rng.gen_range(2.0..8.0),
            rng.gen_range(-6.0..6.0),
        );
        let handle = colliders.insert(
            Collider::sphere_at(position, rng.gen_range(0.3..0.8))
                .with_owner(OwnerId(200 + i))
                .with_layers(CollisionLayers::DEBRIS, CollisionLayers::all()),
        );
        bodies.push(Body {
            handle,
            velocity: Vec3::zeros(),
        });
    }

    let sweeper = colliders.insert(
        Collider::capsule_between(Vec3::new(-10.0, 0.5, 0.0), Vec3::new(-10.0, 2.5, 0.0), 0.5)
            .with_owner(OwnerId(300))
            .with_layers(CollisionLayers::PLAYER, CollisionLayers::all()),
    );
    let camera_body = colliders.insert(
        Collider::sphere_at(Vec3::new(0.0, 6.0, 8.0), 0.3)
            .with_owner(CAMERA_OWNER)
            .with_layers(CollisionLayers::CAMERA, CollisionLayers::empty()),
    );

    let mut handles = vec![floor, sweeper, camera_body];
    handles.extend(bodies.iter().map(|b| b.handle));
    manager.register_many(&colliders, handles);
    log::info!(
        "Registered {} colliders, BVH has {} nodes (depth {})",
        manager.len(),
        manager.bvh().node_count(),
        manager.bvh().depth()
    );

    let mut listener = LoggingListener {
        frame: 0,
        begins: 0,
        ends: 0,
    };

    for frame in 0..FRAMES {
        listener.frame = frame;

        for body in &mut bodies {
            let Some(collider) = colliders.get_mut(body.handle) else {
                continue;
            };
            body.velocity.y += GRAVITY * DT;
            let mut position = collider.transform.position + body.velocity * DT;
            let radius = match collider.shape {
                CollisionShape::Sphere { radius } => radius,
                _ => 0.0,
            };
            if position.y < radius {
                position.y = radius;
                body.velocity.y = -body.velocity.y * 0.4;
            }
            collider.transform.position = position;
            manager.mark_dirty(&colliders, body.handle);
        }

        if let Some(collider) = colliders.get_mut(sweeper) {
            collider.transform.position.x += 6.0 * DT;
        }
        manager.mark_dirty(&colliders, sweeper);

        manager.update_collisions(&colliders, DT, &mut listener);

        // Spring-arm probe from the camera toward the origin
        let probe: WorldSpaceShape = Sphere::new(Vec3::new(0.0, 3.0, 4.0), 1.0).into();
        let hits = manager.overlap_probe(&colliders, &probe, Some(CAMERA_OWNER));
        if !hits.is_empty() {
            log::debug!("[frame {frame}] camera probe blocked by {} collider(s)", hits.len());
        }

        visualizer.draw_frame(&manager, &colliders);
        log::trace!("[frame {frame}] {} debug shapes", visualizer.get_shapes().len());
        visualizer.update(DT);
    }

    let stats = manager.stats();
    log::info!(
        "Done: {} begin / {} end notifications, last frame {:?}",
        listener.begins,
        listener.ends,
        stats
    );
    manager.dump_bvh();
    Ok(())
}
