//! Exposes testing, profiling and tracing capabilities.
//!
//! A [`Tracer`] is passed to [`Orchestrator::update`](crate::system::Orchestrator::update)
//! and receives an event for every step of a tick,
//! including the failures that the phases isolate.

/// Defines the [`Tracer`] trait and implements the [`Log`] and [`Aggregate`] types.
///
/// All tracer method parameters must be [`Copy`] (references included).
macro_rules! define_tracer {
    (
        $(
            $(#[$meta:meta])*
            fn $name:ident(
                &self
                $(,$logged_ident:ident: $logged_ty:ty)*
                $(,)?
            );
        )*
    ) => {
        /// A tracer used for recording the events throughout a tick.
        ///
        /// Can be used for profiling and testing.
        pub trait Tracer {
            $(
                $(#[$meta])*
                #[allow(unused_variables)]
                fn $name(&self, $($logged_ident: $logged_ty,)*) {}
            )*
        }

        impl Tracer for Log {
            $(
                #[allow(unused_variables)]
                fn $name(&self, $($logged_ident: $logged_ty,)*) {
                    log::log!(self.0, concat!(stringify!($name), "(", $(
                        stringify!($logged_ident),
                        " = {",
                        stringify!($logged_ident),
                        ":?}, ",
                    )* ")"), $(
                        $logged_ident = $logged_ident,
                    )*);
                }
            )*
        }

        impl_tuple_accumulate! {
            @TYPES (T1, T2, T3, T4, T5, T6, T7, T8);
            $(
                @VARS (t1, t2, t3, t4, t5, t6, t7, t8);
                @METHOD {fn $name(&self, $($logged_ident: $logged_ty,)*);}
            )*
        }
    };
}

macro_rules! impl_tuple {
    (
        @TYPES ($($ty:ident),* $(,)?);
        $(
            @VARS ($($vars:ident),* $(,)?);
            @METHOD {fn $name:ident(&self, $($arg_ident:ident: $arg_ty:ty,)*);}
        )*
    ) => {
        impl<$($ty: Tracer),*> Tracer for Aggregate<($($ty,)*)> {
            $(
                fn $name(&self, $($arg_ident: $arg_ty),*) {
                    #[allow(unused_mut, unused_variables)]
                    let mut args = ($($arg_ident,)*);

                    #[allow(dead_code)]
                    fn call_with_args(tracer: &impl Tracer, ($($arg_ident,)*): &mut ($($arg_ty,)*)) {
                        tracer.$name($(*$arg_ident,)*);
                    }

                    let Aggregate(($($vars,)*)) = self;
                    $(
                        call_with_args($vars, &mut args);
                    )*
                }
            )*
        }
    };
}

macro_rules! impl_tuple_accumulate {
    (@TYPES (); $(@VARS (); @METHOD {$($body:tt)*})*) => {
        impl_tuple! {
            @TYPES ();
            $(
                @VARS ();
                @METHOD {$($body)*}
            )*
        }
    };
    (
        @TYPES ($first_ty:ident $(, $rest_ty:ident)* $(,)?);
        $(
            @VARS ($first_var:ident $(, $rest_var:ident)* $(,)?);
            @METHOD {$($body:tt)*}
        )*
    ) => {
        impl_tuple! {
            @TYPES ($first_ty $(, $rest_ty)* );
            $(
                @VARS ($first_var $(, $rest_var)*);
                @METHOD {$($body)*}
            )*
        }

        impl_tuple_accumulate! {
            @TYPES ($($rest_ty),*);
            $(
                @VARS ($($rest_var),*);
                @METHOD {$($body)*}
            )*
        }
    };
}

define_tracer! {
    /// A tick starts.
    fn start_tick(&self);

    /// A tick ends.
    fn end_tick(&self);

    /// A phase starts.
    fn start_phase(&self, phase: &str);

    /// A phase ends.
    fn end_phase(&self, phase: &str);

    /// The phase at `position` in the orchestrator was already borrowed and got skipped.
    fn phase_busy(&self, position: usize);

    /// A system starts running on `nodes` matching entities.
    fn start_system(&self, phase: &str, system: &str, nodes: usize);

    /// A system stops running, whether it succeeded or not.
    fn end_system(&self, phase: &str, system: &str);

    /// A system returned an error, or could not be borrowed at all.
    ///
    /// Borrowed systems are named by their position in the phase
    /// and do not receive `start_system`/`end_system`.
    fn system_failed(&self, phase: &str, system: &str, error: &anyhow::Error);

    /// A pre-update or post-update callback of a phase failed.
    fn callback_failed(&self, phase: &str, stage: Stage, error: &anyhow::Error);
}

/// The phase callbacks that run around the systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Runs before the first system of the phase.
    PreUpdate,
    /// Runs after the last system of the phase.
    PostUpdate,
}

/// An empty tracer.
pub struct Noop;

impl Tracer for Noop {}

/// Groups multiple tracers into a tuple and dispatches each call to them in serial.
pub struct Aggregate<T>(
    /// A tuple of child tracers to execute in serial.
    pub T,
);

/// A tracer that logs all events.
pub struct Log(
    /// The log level to log events with.
    pub log::Level,
);
