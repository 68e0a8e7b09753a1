/*!
The permission check every gated action goes through first.
*/
use crate::error::{Error, Result};
use crate::role::{Action, Role};
use crate::store::RightsStore;

pub struct Gate<'a> {
    rights: &'a RightsStore,
}

impl<'a> Gate<'a> {
    pub fn new(rights: &'a RightsStore) -> Self { Self { rights } }

    /// `Ok(())` if `role` may currently perform `action`.
    ///
    /// Reads the rights file on every call, so an Admin's change applies to
    /// the very next check.
    pub fn check_allowed(&self, role: Role, action: Action) -> Result<()> {
        log::trace!("Gate::check_allowed( {}, {} ) called.", &role, &action);

        if !role.has_action(action) {
            log::warn!("{} has no {} action at all.", &role, &action);
            return Err(Error::PermissionDenied { role, action });
        }

        let rights = self.rights.get_rights(role)?;
        if rights.is_enabled(action) {
            Ok(())
        } else {
            log::warn!("Denied {} to {}.", &action, &role);
            Err(Error::PermissionDenied { role, action })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::ensure_logging;

    use tempfile::TempDir;

    #[test]
    fn follows_the_file() {
        ensure_logging();
        let dir = TempDir::new().unwrap();
        let rs = RightsStore::new(dir.path().join("access_rights.txt"));
        rs.initialize_if_absent().unwrap();
        let gate = Gate::new(&rs);

        assert!(gate.check_allowed(Role::Doctor, Action::Delete).is_ok());

        let mut r = rs.get_rights(Role::Doctor).unwrap();
        r.set(Action::Delete, false).unwrap();
        rs.set_rights(&r).unwrap();
        assert!(matches!(
            gate.check_allowed(Role::Doctor, Action::Delete),
            Err(Error::PermissionDenied { role: Role::Doctor, action: Action::Delete })
        ));
        assert!(gate.check_allowed(Role::Doctor, Action::View).is_ok());

        r.set(Action::Delete, true).unwrap();
        rs.set_rights(&r).unwrap();
        assert!(gate.check_allowed(Role::Doctor, Action::Delete).is_ok());
    }

    #[test]
    fn foreign_actions_denied() {
        ensure_logging();
        let dir = TempDir::new().unwrap();
        let rs = RightsStore::new(dir.path().join("access_rights.txt"));
        rs.initialize_if_absent().unwrap();
        let gate = Gate::new(&rs);

        assert!(gate.check_allowed(Role::Receptionist, Action::Delete).is_err());
        assert!(gate.check_allowed(Role::Admin, Action::View).is_err());
    }
}
