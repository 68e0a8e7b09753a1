/*!
Patient records.
*/
/// Oldest age the registration prompt will accept.
pub const MAX_AGE: u8 = 150;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Patient {
    /// Assigned by `Store::next_id()`; never 0.
    pub id: u32,
    pub name: String,
    pub age: u8,
    pub gender: char,
    pub address: String,
    /// Digits only.
    pub contact: String,
    /// Empty means no diagnosis yet.
    pub diagnosis: String,
}

impl Patient {
    /// One-line listing, as shown before asking for an id.
    pub fn summary(&self) -> String {
        format!("ID: {} - Name: {}", self.id, &self.name)
    }

    /// Every field, one per line.
    pub fn details(&self) -> String {
        format!(
            "Patient ID: {}\nName: {}\nAge: {}\nGender: {}\nAddress: {}\nContact: {}\nDiagnosis: {}",
            self.id, &self.name, self.age, self.gender, &self.address, &self.contact,
            if self.diagnosis.is_empty() { "No diagnosis" } else { &self.diagnosis }
        )
    }
}
