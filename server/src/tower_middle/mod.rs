/// Tower middleware module
///
/// Route admission runs in front of every handler and only looks at the
/// request path and the request's own cookies.
pub mod route_admission;

pub use route_admission::{
    Admission, RouteAdmissionLayer, RouteAdmissionService, RouteClass, admit, classify,
};
