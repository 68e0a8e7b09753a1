/*!
Admin menu actions: editing the other roles' access rights.

Admins never touch patient records.
*/
use super::*;

/// Show `role`'s current rights, offer to flip each one, and write the new
/// set only if the operator confirms. Declining throws away every pending
/// flip.
pub fn manage<C: Console + ?Sized>(con: &mut C, rights: &RightsStore, role: Role) -> Result<()> {
    log::trace!("admin::manage( {} ) called.", &role);

    let current = rights.get_rights(role)?;

    con.say(&format!("\n{} Current Status\n--------------------------------", &role));
    for (action, enabled) in current.iter() {
        con.say(&format!(
            "{} - {}",
            capitalize(action.name()),
            if enabled { "ENABLED" } else { "DISABLED" }
        ));
    }

    let mut pending = current.clone();
    for (action, enabled) in current.iter() {
        let prompt = if enabled {
            format!("Disable {}? (Y/N): ", &action)
        } else {
            format!("Enable {}? (Y/N): ", &action)
        };
        if ask_yes(con, &prompt)? {
            pending.toggle(action)?;
        }
    }

    if pending == current {
        con.say("No changes applied!");
        return Ok(());
    }

    if ask_yes(con, "Apply changes? (Y/N): ")? {
        rights.set_rights(&pending)?;
        con.say("Changes applied!");
    } else {
        log::info!("Pending {} rights changes discarded.", &role);
        con.say("Changes discarded.");
    }
    Ok(())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
