/// Derives a [`node::Schema`](crate::node::Schema) implementation for a struct
/// whose fields are [`ComponentType`](crate::comp::ComponentType)s.
///
/// Each field becomes a required field of the generated [`NodeSchema`](crate::node::NodeSchema),
/// named after the field unless renamed with `#[nodec(rename = "...")]`.
/// The schema is named after the struct unless renamed with `#[nodec(name = "...")]`.
///
/// # Example
/// ```
/// use std::rc::Rc;
///
/// use nodec::comp::ComponentType;
/// use nodec::node::Schema;
///
/// #[derive(nodec::NodeSchema)]
/// #[nodec(name = "Walker")]
/// struct Walk {
///     position: ComponentType<[f32; 2]>,
///     #[nodec(rename = "vel")]
///     velocity: ComponentType<[f32; 2]>,
/// }
///
/// let mut core = nodec::Core::builder().build().unwrap();
/// let walk = Walk {
///     position: core.define_component_type("Position").unwrap(),
///     velocity: core.define_component_type("Velocity").unwrap(),
/// };
///
/// let meta = Rc::new(walk.meta());
/// assert_eq!(meta.name(), "Walker");
/// assert_eq!(meta.schema().get("vel"), Some(walk.velocity.id()));
///
/// let archetype = core.register_node_schema(meta).unwrap();
/// assert_eq!(archetype.bits().len(), 2);
/// ```
///
/// Field names must be unique after renaming,
/// so the following fails to compile with a `Duplicate node schema field name` error:
///
/// ```compile_fail
/// use nodec::comp::ComponentType;
///
/// #[derive(nodec::NodeSchema)]
/// struct Walk {
///     #[nodec(rename = "position")]
///     start:    ComponentType<[f32; 2]>,
///     position: ComponentType<[f32; 2]>,
/// }
/// ```
///
/// Inside this crate, use `#[nodec(nodec_as(crate))]` to refer to the crate by `crate`.
#[doc(inline)]
pub use nodec_codegen::NodeSchema;
