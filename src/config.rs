/*!
Configuration: file locations, log level, and role credentials.

Everything has a default; an optional TOML file can override any of it:

```toml
patient_file = "data/patients.txt"
rights_file = "data/access_rights.txt"
log_level = "info"
doctor_uname = "house"
doctor_password = "vicodin"
```
*/
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::role::Role;

pub const DEFAULT_CONFIG_FILE: &str = "hospital.toml";

#[derive(Deserialize)]
struct ConfigFile {
    patient_file: Option<String>,
    rights_file: Option<String>,
    log_level: Option<String>,
    admin_uname: Option<String>,
    admin_password: Option<String>,
    doctor_uname: Option<String>,
    doctor_password: Option<String>,
    receptionist_uname: Option<String>,
    receptionist_password: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credential {
    pub uname: String,
    pub password: String,
}

impl Credential {
    fn new(uname: &str, password: &str) -> Self {
        Self { uname: uname.to_owned(), password: password.to_owned() }
    }

    pub fn matches(&self, uname: &str, password: &str) -> bool {
        self.uname == uname && self.password == password
    }
}

#[derive(Debug)]
pub struct Cfg {
    pub patient_file: PathBuf,
    pub rights_file: PathBuf,
    pub log_level: simplelog::LevelFilter,
    pub admin: Credential,
    pub doctor: Credential,
    pub receptionist: Credential,
}

impl std::default::Default for Cfg {
    fn default() -> Self {
        Self {
            patient_file: PathBuf::from("patients.txt"),
            rights_file: PathBuf::from("access_rights.txt"),
            log_level: simplelog::LevelFilter::Warn,
            admin: Credential::new("admin", "admin123"),
            doctor: Credential::new("doctor", "doctor123"),
            receptionist: Credential::new("reception", "reception123"),
        }
    }
}

impl Cfg {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file_contents = std::fs::read_to_string(path)
            .map_err(|e| Error::from(e).annotate("Unable to read config file"))?;
        Self::from_toml(&file_contents)
    }

    fn from_toml(text: &str) -> Result<Self> {
        let cf: ConfigFile = toml::from_str(text)
            .map_err(|e| Error::Config(
                format!("Unable to deserialize config file: {}", &e)
            ))?;

        let mut c = Self::default();

        if let Some(s) = cf.patient_file {
            c.patient_file = PathBuf::from(s);
        }
        if let Some(s) = cf.rights_file {
            c.rights_file = PathBuf::from(s);
        }
        if let Some(s) = cf.log_level {
            c.log_level = crate::parse_log_level(&s).ok_or_else(|| Error::Config(
                format!("{:?} is not a log level", &s)
            ))?;
        }
        if let Some(s) = cf.admin_uname {
            c.admin.uname = s;
        }
        if let Some(s) = cf.admin_password {
            c.admin.password = s;
        }
        if let Some(s) = cf.doctor_uname {
            c.doctor.uname = s;
        }
        if let Some(s) = cf.doctor_password {
            c.doctor.password = s;
        }
        if let Some(s) = cf.receptionist_uname {
            c.receptionist.uname = s;
        }
        if let Some(s) = cf.receptionist_password {
            c.receptionist.password = s;
        }

        c.validate()?;
        Ok(c)
    }

    /// Read `path` if it exists, otherwise use the defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            log::trace!("Reading configuration from {}.", path.display());
            Self::from_file(path)
        } else {
            log::trace!("No {}; using default configuration.", path.display());
            Ok(Self::default())
        }
    }

    pub fn credential(&self, role: Role) -> &Credential {
        match role {
            Role::Admin => &self.admin,
            Role::Doctor => &self.doctor,
            Role::Receptionist => &self.receptionist,
        }
    }

    /// Each role's username has to be distinct and non-empty.
    pub fn validate(&self) -> Result<()> {
        for (n, a) in Role::ALL.iter().enumerate() {
            let ca = self.credential(*a);
            if ca.uname.is_empty() {
                return Err(Error::Config(format!("{} username is empty", a)));
            }
            for b in Role::ALL.iter().skip(n + 1) {
                if ca.uname == self.credential(*b).uname {
                    return Err(Error::Config(format!(
                        "{} and {} share the username {:?}", a, b, &ca.uname
                    )));
                }
            }
        }
        Ok(())
    }
}
