/*!
Receptionist menu actions: registering new patients.
*/
use crate::patient::MAX_AGE;
use super::*;

pub fn parse_age(s: &str) -> Result<u8> {
    match s.trim().parse::<u8>() {
        Ok(n) if n <= MAX_AGE => Ok(n),
        _ => Err(Error::InvalidInput(format!(
            "age must be a whole number from 0 to {}.", MAX_AGE
        ))),
    }
}

/// `M`, `F`, or `O`, in either case.
pub fn parse_gender(s: &str) -> Result<char> {
    match s.trim() {
        "M" | "m" => Ok('M'),
        "F" | "f" => Ok('F'),
        "O" | "o" => Ok('O'),
        _ => Err(Error::InvalidInput("gender must be M, F, or O.".to_owned())),
    }
}

pub fn parse_contact(s: &str) -> Result<String> {
    let s = s.trim();
    if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
        Ok(s.to_owned())
    } else {
        Err(Error::InvalidInput("contact number must be digits only.".to_owned()))
    }
}

/// Collect a new patient's details and append them to the store. Returns
/// the id the patient was given.
pub fn register<C: Console + ?Sized>(con: &mut C, store: &Store) -> Result<u32> {
    log::trace!("receptionist::register() called.");

    let name = ask_valid(con, "Enter patient name: ", |s| parse_text(s, "Name", false))?;
    let age = ask_valid(con, "Enter patient age: ", parse_age)?;
    let gender = ask_valid(con, "Enter patient gender (M/F/O): ", parse_gender)?;
    let address = ask_valid(con, "Enter patient address: ", |s| parse_text(s, "Address", false))?;
    let contact = ask_valid(con, "Enter patient contact number: ", parse_contact)?;
    let diagnosis = ask_valid(
        con,
        "Enter patient diagnosis (blank for none): ",
        |s| parse_text(s, "Diagnosis", true)
    )?;

    let p = Patient {
        id: store.next_id()?,
        name, age, gender, address, contact, diagnosis,
    };
    store.append(&p)?;

    con.say(&format!("Patient registered successfully with ID: {}", p.id));
    Ok(p.id)
}
