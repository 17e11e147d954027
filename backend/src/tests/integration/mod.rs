pub mod api_validation;
pub mod maintenance_sla;
