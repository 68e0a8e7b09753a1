/*!
The access-rights file.

```text
Doctor|1|1|1
Receptionist|1|0
```

One line per gated role: the role name, then one `1`/`0` flag per action
in `Role::actions()` order. Code outside this module never sees the flag
positions; it asks about an `Action` by name.

Only a role's first line is read. Writing a role's rights replaces all of
its lines, so a duplicated line can't keep stale flags around.
*/
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use smallvec::SmallVec;

use super::{open_rows, rewrite_atomically};
use crate::codec::SEPARATOR;
use crate::error::{Error, Result};
use crate::role::{Action, Role};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rights {
    role: Role,
    /// Parallel to `role.actions()`.
    flags: SmallVec<[bool; 4]>,
}

impl Rights {
    pub fn all_enabled(role: Role) -> Self {
        let flags = role.actions().iter().map(|_| true).collect();
        Self { role, flags }
    }

    /// Build from flags in `role.actions()` order. The count has to match.
    pub fn from_flags(role: Role, flags: &[bool]) -> Result<Self> {
        if flags.len() != role.actions().len() {
            return Err(Error::InvalidInput(format!(
                "{} has {} actions; got {} flags.",
                &role, role.actions().len(), flags.len()
            )));
        }
        Ok(Self { role, flags: SmallVec::from_slice(flags) })
    }

    pub fn role(&self) -> Role { self.role }

    fn position(&self, action: Action) -> Option<usize> {
        self.role.actions().iter().position(|a| *a == action)
    }

    /// Actions the role doesn't have are never enabled.
    pub fn is_enabled(&self, action: Action) -> bool {
        match self.position(action) {
            Some(n) => self.flags[n],
            None => false,
        }
    }

    pub fn set(&mut self, action: Action, enabled: bool) -> Result<()> {
        match self.position(action) {
            Some(n) => {
                self.flags[n] = enabled;
                Ok(())
            },
            None => Err(Error::InvalidInput(format!(
                "{} has no {} action.", &self.role, &action
            ))),
        }
    }

    pub fn toggle(&mut self, action: Action) -> Result<()> {
        let now = self.is_enabled(action);
        self.set(action, !now)
    }

    /// `(action, enabled)` in file order.
    pub fn iter(&self) -> impl Iterator<Item = (Action, bool)> + '_ {
        self.role.actions().iter().copied().zip(self.flags.iter().copied())
    }

    pub fn flags(&self) -> &[bool] { &self.flags }

    fn to_line(&self) -> String {
        let mut line = self.role.to_string();
        for f in self.flags.iter() {
            line.push(SEPARATOR);
            line.push(if *f { '1' } else { '0' });
        }
        line
    }

    fn from_record(role: Role, row: &csv::StringRecord) -> Result<Self> {
        let line = row.position().map(|p| p.line()).unwrap_or(0);

        let mut flags: SmallVec<[bool; 4]> = SmallVec::new();
        for tok in row.iter().skip(1) {
            match tok {
                "1" => flags.push(true),
                "0" => flags.push(false),
                x => {
                    return Err(Error::Format {
                        line,
                        msg: format!("{:?} is not a 1/0 flag for {}", x, &role),
                    });
                },
            }
        }

        Self::from_flags(role, &flags).map_err(|_| Error::Format {
            line,
            msg: format!(
                "{} should have {} flags, found {}",
                &role, role.actions().len(), flags.len()
            ),
        })
    }
}

pub struct RightsStore {
    path: PathBuf,
}

impl RightsStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        log::trace!("RightsStore::new( {} ) called.", path.display());
        Self { path }
    }

    pub fn path(&self) -> &Path { &self.path }

    /// Create the file with every flag enabled if it isn't there yet.
    ///
    /// Returns whether it had to be created.
    pub fn initialize_if_absent(&self) -> Result<bool> {
        log::trace!("RightsStore::initialize_if_absent() called.");

        let mut f = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
        {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                log::trace!("    ...{} already exists.", self.path.display());
                return Ok(false);
            },
            Err(e) => {
                return Err(Error::from(e).annotate(&format!(
                    "Could not create access rights file {}", self.path.display()
                )));
            },
        };

        let mut contents = String::new();
        for role in Role::GATED.iter() {
            contents.push_str(&Rights::all_enabled(*role).to_line());
            contents.push('\n');
        }
        f.write_all(contents.as_bytes())
            .map_err(|e| Error::from(e).annotate(&format!(
                "Could not write access rights file {}", self.path.display()
            )))?;

        log::info!(
            "Access rights file {} didn't exist; created with all rights enabled.",
            self.path.display()
        );
        Ok(true)
    }

    pub fn get_rights(&self, role: Role) -> Result<Rights> {
        log::trace!("RightsStore::get_rights( {} ) called.", &role);

        let mut reader = match open_rows(&self.path)? {
            Some(r) => r,
            None => {
                return Err(Error::Storage(format!(
                    "Could not open access rights file {}", self.path.display()
                )));
            },
        };

        let name = role.to_string();
        for res in reader.records() {
            let row = res?;
            if row.get(0) == Some(name.as_str()) {
                return Rights::from_record(role, &row);
            }
        }

        Err(Error::RoleNotFound(role))
    }

    /// Replace every line for `rights.role()`; other lines are kept as is.
    pub fn set_rights(&self, rights: &Rights) -> Result<()> {
        log::trace!("RightsStore::set_rights( {:?} ) called.", rights);

        let old = match fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::RoleNotFound(rights.role()));
            },
            Err(e) => {
                return Err(Error::from(e).annotate(&format!(
                    "Could not open access rights file {}", self.path.display()
                )));
            },
        };

        let name = rights.role().to_string();
        let mut found = false;
        let mut contents = String::with_capacity(old.len());
        for line in old.lines() {
            if line.split(SEPARATOR).next() == Some(name.as_str()) {
                found = true;
                contents.push_str(&rights.to_line());
            } else {
                contents.push_str(line);
            }
            contents.push('\n');
        }

        if !found {
            return Err(Error::RoleNotFound(rights.role()));
        }

        rewrite_atomically(&self.path, &contents)?;
        log::info!("Access rights updated: {}", rights.to_line());
        Ok(())
    }
}
