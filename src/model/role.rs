#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Admin = 1,
    Employer = 2,
    Employee = 3,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Employer),
            3 => Some(Role::Employee),
            _ => None,
        }
    }

    /// Admins and employers review requests and see every employee's data.
    pub fn can_manage(&self) -> bool {
        matches!(self, Role::Admin | Role::Employer)
    }
}
