//! User-visible error messages. Every error kind maps to one specific,
//! actionable sentence; the presentation layer renders these verbatim.

use stayops_entitlement::{EvalError, ModuleError, SeatError};

use crate::ops::OpError;

pub fn seat_error_message(err: &SeatError) -> String {
    match err {
        SeatError::QuotaExceeded { .. } => {
            "License allocation exceeds subscription limit; increase allocation or remove an \
             existing user before adding this one"
                .to_string()
        }
        SeatError::DuplicateAssignment { .. } => {
            "This user already holds a seat here; each user consumes at most one seat per entity"
                .to_string()
        }
        SeatError::AssignmentNotFound { .. } => {
            "This user does not hold a seat here; refresh the member list and try again".to_string()
        }
        SeatError::EntityExpired { .. } => {
            "This subscription has expired; renew it before managing seats".to_string()
        }
    }
}

pub fn module_error_message(err: &ModuleError) -> String {
    match err {
        ModuleError::AlreadyActive { module } => {
            format!("The {module} module is already active; deactivate it first to change its terms")
        }
        ModuleError::UnknownModule { module, plan } => {
            format!("The {module} module is not part of the {plan} plan; upgrade the plan to use it")
        }
        ModuleError::NotActive { module } => {
            format!("The {module} module is not active on this property")
        }
        ModuleError::ConfigMismatch { module, .. } => {
            format!("The supplied configuration does not belong to the {module} module")
        }
    }
}

pub fn eval_error_message(err: &EvalError) -> String {
    match err {
        EvalError::DivisionUndefined => {
            "This pool has no allocated seats; set an allocation before assigning users".to_string()
        }
        EvalError::DateParse { input } => {
            format!("`{input}` is not a valid date; use YYYY-MM-DD")
        }
    }
}

pub fn op_error_message(err: &OpError) -> String {
    match err {
        OpError::UnitNotFound(_) => "Business unit not found; it may have been removed".to_string(),
        OpError::ClusterNotFound(_) => "Cluster not found; it may have been removed".to_string(),
        OpError::AllocationBelowConsumed { consumed, .. } => format!(
            "Allocation cannot drop below the {consumed} seats currently in use; remove users first"
        ),
        OpError::Seat(e) => seat_error_message(e),
        OpError::Module(e) => module_error_message(e),
        OpError::Eval(e) => eval_error_message(e),
    }
}
