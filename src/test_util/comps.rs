use crate::comp::{ComponentType, TypeRegistry};
use crate::node::{self, NodeSchemaMeta};
use crate::NodeSchema;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Velocity {
    pub dx: f32,
    pub dy: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Health(pub i32);

/// The sample component types, defined in declaration order.
pub struct TestTypes {
    pub position: ComponentType<Position>,
    pub velocity: ComponentType<Velocity>,
    pub health:   ComponentType<Health>,
}

impl TestTypes {
    pub fn define(registry: &mut TypeRegistry) -> Self {
        Self {
            position: registry.define("Position").expect("fresh registry"),
            velocity: registry.define("Velocity").expect("fresh registry"),
            health:   registry.define("Health").expect("fresh registry"),
        }
    }

    /// A schema requiring position and velocity.
    pub fn movement(&self) -> Movement {
        Movement { position: self.position.clone(), velocity: self.velocity.clone() }
    }

    /// A schema requiring position only.
    pub fn located(&self) -> NodeSchemaMeta {
        NodeSchemaMeta::new(
            "Located",
            node::NodeSchema::default().with("position", &self.position),
        )
    }
}

/// position + velocity
#[derive(NodeSchema)]
#[nodec(nodec_as(crate))]
pub struct Movement {
    pub position: ComponentType<Position>,
    #[nodec(rename = "vel")]
    pub velocity: ComponentType<Velocity>,
}
