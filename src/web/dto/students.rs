use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::entity::{Group, GroupHistory, Student};

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct TransferBody {
    pub group_id: Uuid,
    /// Defaults to today
    pub transfer_date: Option<NaiveDate>,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct StudentHistoryResponse {
    pub student: Student,
    /// Group of the latest entry, or of the latest one on or before `on`
    pub current_group: Option<Group>,
    pub entries: Vec<GroupHistory>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StudentsQuery {
    pub group_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    /// Resolve the group as of this date instead of the latest entry
    pub on: Option<NaiveDate>,
}
