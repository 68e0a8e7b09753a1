/*!
Doctor menu actions: diagnosis updates and deletions.

(Viewing is shared with the Receptionist; see `super::view_patients()`.)
*/
use super::*;

/// Ask for ids until one is on the list, or `0`.
fn pick_patient<'p, C: Console + ?Sized>(
    con: &mut C,
    patients: &'p [Patient],
    prompt: &str,
) -> Result<Option<&'p Patient>> {
    loop {
        let id = match ask_valid(con, prompt, parse_id)? {
            Some(id) => id,
            None => { return Ok(None); },
        };
        match patients.iter().find(|p| p.id == id) {
            Some(p) => { return Ok(Some(p)); },
            None => { con.say("Patient not found. Please try again."); },
        }
    }
}

pub fn update<C: Console + ?Sized>(con: &mut C, store: &Store) -> Result<()> {
    log::trace!("doctor::update() called.");

    let patients = store.load_all()?;
    if !list_patients(con, &patients) {
        return Ok(());
    }

    let mut p = match pick_patient(con, &patients, "\nEnter patient ID to update (0 to cancel): ")? {
        Some(p) => p.clone(),
        None => { return Ok(()); },
    };

    con.say(&format!("\nCurrent Diagnosis: {}", &p.diagnosis));
    p.diagnosis = ask_valid(con, "Enter new diagnosis: ", |s| parse_text(s, "Diagnosis", true))?;
    store.update(&p)?;

    con.say("Diagnosis updated!");
    Ok(())
}

pub fn delete<C: Console + ?Sized>(con: &mut C, store: &Store) -> Result<()> {
    log::trace!("doctor::delete() called.");

    let patients = store.load_all()?;
    if !list_patients(con, &patients) {
        return Ok(());
    }

    let id = match pick_patient(con, &patients, "\nEnter patient ID to delete (0 to cancel): ")? {
        Some(p) => p.id,
        None => { return Ok(()); },
    };

    if ask_yes(con, "Confirm deletion? (Y/N): ")? {
        store.delete(id)?;
        con.say("Patient record deleted.");
    } else {
        con.say("Deletion cancelled.");
    }
    Ok(())
}
