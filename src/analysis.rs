pub mod global_edf_density;

pub mod prelude {
    pub use super::global_edf_density::{
        demand_bound_function,
        load,
        worst_case_load,
        global_edf_sufficient_test,
    };
}
