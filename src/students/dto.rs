use serde::{Deserialize, Serialize};

use super::repo_types::Student;

/// Body of create and update requests. Missing fields are empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StudentRequest {
    pub name: String,
    pub email: String,
    pub address: String,
    pub gender: String,
}

impl From<StudentRequest> for Student {
    fn from(r: StudentRequest) -> Self {
        Self {
            name: r.name,
            email: r.email,
            address: r.address,
            gender: r.gender,
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
