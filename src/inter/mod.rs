/*!
Interoperation between the operator and the stores.

(Reading and writing the files themselves is `store`'s business.)

The `App` is the session state machine: it starts `LoggedOut`, logs an
operator in as one `Role`, runs that role's menu until "Back", and ends on
"Exit" or when the console runs out of input. Every gated menu entry goes
through the `Gate` before the role-specific code in `admin`, `doctor`, or
`receptionist` gets to touch anything.

All text goes through the `Console` trait, so the whole thing can be driven
by a script as easily as by a person.
*/
use std::io::{BufRead, Write};

use crate::{
    config::Cfg,
    error::{Error, Result},
    gate::Gate,
    patient::Patient,
    role::{Action, MenuEntry, Role},
    store::{RightsStore, Store},
};

pub mod admin;
pub mod doctor;
pub mod receptionist;

/// Line-oriented operator I/O.
pub trait Console {
    /// Show `text` followed by a line break.
    fn say(&mut self, text: &str);

    /// Show `prompt` and read one line (without its terminator).
    ///
    /// Returns `Error::EndOfInput` once there's nothing left to read.
    fn ask(&mut self, prompt: &str) -> Result<String>;
}

/// `Console` over the process's stdin and stdout.
pub struct StdConsole {
    stdin: std::io::Stdin,
    stdout: std::io::Stdout,
}

impl StdConsole {
    pub fn new() -> Self {
        Self { stdin: std::io::stdin(), stdout: std::io::stdout() }
    }
}

impl Default for StdConsole {
    fn default() -> Self { Self::new() }
}

impl Console for StdConsole {
    fn say(&mut self, text: &str) {
        let mut out = self.stdout.lock();
        if let Err(e) = writeln!(out, "{}", text) {
            log::error!("Error writing to stdout: {}", &e);
        }
    }

    fn ask(&mut self, prompt: &str) -> Result<String> {
        {
            let mut out = self.stdout.lock();
            if let Err(e) = write!(out, "{}", prompt).and_then(|_| out.flush()) {
                log::error!("Error writing to stdout: {}", &e);
            }
        }

        let mut line = String::new();
        match self.stdin.lock().read_line(&mut line) {
            Ok(0) => Err(Error::EndOfInput),
            Ok(_) => {
                while line.ends_with('\n') || line.ends_with('\r') {
                    line.pop();
                }
                Ok(line)
            },
            Err(e) => {
                log::error!("Error reading stdin: {}", &e);
                Err(Error::EndOfInput)
            },
        }
    }
}

/// Keep asking until `parse` accepts the answer. `InvalidInput` is shown
/// to the operator and asked again; any other error is returned.
pub fn ask_valid<C, T, F>(con: &mut C, prompt: &str, parse: F) -> Result<T>
where
    C: Console + ?Sized,
    F: Fn(&str) -> Result<T>,
{
    loop {
        let answer = con.ask(prompt)?;
        match parse(&answer) {
            Ok(x) => { return Ok(x); },
            Err(e @ Error::InvalidInput(_)) => {
                log::trace!("Rejected {:?} for {:?}: {}", &answer, prompt, &e);
                con.say(&e.to_string());
            },
            Err(e) => { return Err(e); },
        }
    }
}

/// `Y`/`y` (or anything starting with it) is yes; everything else is no.
pub fn ask_yes<C: Console + ?Sized>(con: &mut C, prompt: &str) -> Result<bool> {
    let answer = con.ask(prompt)?;
    Ok(matches!(answer.trim().chars().next(), Some('y') | Some('Y')))
}

/// A number from `1` to `max`.
pub fn parse_choice(s: &str, max: usize) -> Result<usize> {
    match s.trim().parse::<usize>() {
        Ok(n) if n >= 1 && n <= max => Ok(n),
        _ => Err(Error::InvalidInput(format!("choose a number from 1 to {}.", max))),
    }
}

/// A patient id; `0` means "cancel" and comes back as `None`.
pub fn parse_id(s: &str) -> Result<Option<u32>> {
    match s.trim().parse::<u32>() {
        Ok(0) => Ok(None),
        Ok(n) => Ok(Some(n)),
        Err(_) => Err(Error::InvalidInput(format!("{:?} is not a patient ID.", s.trim()))),
    }
}

/// Free text for a record field. It can't hold the record separator or
/// span lines, because the codec doesn't escape either.
pub fn parse_text(s: &str, field: &str, allow_empty: bool) -> Result<String> {
    let s = s.trim();
    if s.contains(crate::codec::SEPARATOR) {
        return Err(Error::InvalidInput(format!(
            "{} can't contain '{}'.", field, crate::codec::SEPARATOR
        )));
    }
    if s.contains(|c: char| c == '\n' || c == '\r') {
        return Err(Error::InvalidInput(format!("{} must be a single line.", field)));
    }
    if s.is_empty() && !allow_empty {
        return Err(Error::InvalidInput(format!("{} can't be blank.", field)));
    }
    Ok(s.to_owned())
}

/// Short list of every patient, or a notice if there aren't any. Returns
/// `false` when there was nothing to list.
pub(crate) fn list_patients<C: Console + ?Sized>(con: &mut C, patients: &[Patient]) -> bool {
    if patients.is_empty() {
        con.say("No patients registered yet.");
        return false;
    }
    con.say("\nPatient List:");
    for p in patients.iter() {
        con.say(&p.summary());
    }
    true
}

/// List everyone, then show one patient's details.
pub fn view_patients<C: Console + ?Sized>(con: &mut C, store: &Store) -> Result<()> {
    log::trace!("view_patients() called.");

    let patients = store.load_all()?;
    if !list_patients(con, &patients) {
        return Ok(());
    }

    let id = match ask_valid(con, "\nEnter patient ID to view details (0 to cancel): ", parse_id)? {
        Some(id) => id,
        None => { return Ok(()); },
    };

    match patients.iter().find(|p| p.id == id) {
        Some(p) => {
            con.say("\nPatient Details:");
            con.say(&p.details());
            Ok(())
        },
        None => Err(Error::RecordNotFound(id)),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Session {
    LoggedOut,
    LoggedIn(Role),
}

fn main_menu_text() -> String {
    let mut s = String::from("\n---Hospital Management---");
    for (n, role) in Role::ALL.iter().enumerate() {
        s.push_str(&format!("\n{}. {}", n + 1, role));
    }
    s.push_str(&format!("\n{}. Exit", Role::ALL.len() + 1));
    s
}

fn role_menu_text(role: Role) -> String {
    let mut s = format!("\n---{}---", &role);
    for (n, entry) in role.menu().iter().enumerate() {
        s.push_str(&format!("\n{}. {}", n + 1, entry.label()));
    }
    s.push_str(&format!("\n{}. Back", role.logout_index()));
    s
}

pub struct App<C: Console> {
    cfg: Cfg,
    store: Store,
    rights: RightsStore,
    con: C,
    session: Session,
}

impl<C: Console> App<C> {
    pub fn new(cfg: Cfg, con: C) -> Self {
        log::trace!(
            "App::new( [ patients: {}, rights: {} ], [ Console ] ) called.",
            cfg.patient_file.display(), cfg.rights_file.display()
        );

        let store = Store::new(&cfg.patient_file);
        let rights = RightsStore::new(&cfg.rights_file);
        Self { cfg, store, rights, con, session: Session::LoggedOut }
    }

    /// Make sure the rights file exists. Failing here means there's no
    /// point going on.
    pub fn init(&self) -> Result<()> {
        self.rights.initialize_if_absent()
            .map(|_| ())
            .map_err(|e| e.annotate("Unable to initialize access rights"))
    }

    pub fn session(&self) -> Session { self.session }
    pub fn store(&self) -> &Store { &self.store }
    pub fn rights(&self) -> &RightsStore { &self.rights }
    pub fn console(&self) -> &C { &self.con }

    /// `LoggedOut` → `LoggedIn(role)` if the credentials are `role`'s.
    pub fn login(&mut self, role: Role, uname: &str, password: &str) -> Result<()> {
        log::trace!("App::login( {}, {:?}, [ password ] ) called.", &role, uname);

        if self.cfg.credential(role).matches(uname, password) {
            log::info!("{} logged in as {}.", uname, &role);
            self.session = Session::LoggedIn(role);
            Ok(())
        } else {
            log::warn!("Failed {} login attempt as {:?}.", &role, uname);
            Err(Error::InvalidCredentials)
        }
    }

    pub fn logout(&mut self) {
        if let Session::LoggedIn(role) = self.session {
            log::info!("{} logged out.", &role);
        }
        self.session = Session::LoggedOut;
    }

    /**
    Carry out one menu entry for the logged-in role.

    Gated actions are checked against the rights file first; a denial
    comes back as `Error::PermissionDenied` without the store having been
    read or written.
    */
    pub fn perform(&mut self, entry: MenuEntry) -> Result<()> {
        log::trace!("App::perform( {:?} ) called in {:?}.", &entry, &self.session);

        let role = match self.session {
            Session::LoggedIn(role) => role,
            Session::LoggedOut => {
                return Err(Error::InvalidInput("nobody is logged in.".to_owned()));
            },
        };
        if !role.menu().contains(&entry) {
            return Err(Error::InvalidInput(format!(
                "{} has no {:?} option.", &role, entry.label()
            )));
        }

        match entry {
            MenuEntry::Manage(target) => admin::manage(&mut self.con, &self.rights, target),
            MenuEntry::Act(action) => {
                Gate::new(&self.rights).check_allowed(role, action)?;
                match action {
                    Action::View => view_patients(&mut self.con, &self.store),
                    Action::Update => doctor::update(&mut self.con, &self.store),
                    Action::Delete => doctor::delete(&mut self.con, &self.store),
                    Action::Register => receptionist::register(&mut self.con, &self.store)
                        .map(|_| ()),
                }
            },
        }
    }

    /// Run menus until the operator exits or input runs out.
    pub fn run(&mut self) -> Result<()> {
        match self.main_loop() {
            Err(Error::EndOfInput) => {
                log::info!("Input closed; exiting.");
                self.logout();
                Ok(())
            },
            x => x,
        }
    }

    fn main_loop(&mut self) -> Result<()> {
        let exit = Role::ALL.len() + 1;
        loop {
            self.con.say(&main_menu_text());
            let n = ask_valid(&mut self.con, "Enter your choice: ", |s| parse_choice(s, exit))?;
            if n == exit {
                self.con.say("Goodbye.");
                return Ok(());
            }

            let role = Role::ALL[n - 1];
            let uname = self.con.ask("Username: ")?;
            let password = self.con.ask("Password: ")?;
            match self.login(role, uname.trim(), &password) {
                Ok(()) => self.role_loop(role)?,
                Err(e) => self.con.say(&e.to_string()),
            }
        }
    }

    fn role_loop(&mut self, role: Role) -> Result<()> {
        loop {
            self.con.say(&role_menu_text(role));
            let choice = ask_valid(&mut self.con, "Enter your choice: ", |s| {
                parse_choice(s, role.logout_index())
                    .and_then(|n| role.menu_choice(n).map_err(Error::InvalidInput))
            })?;

            let entry = match choice {
                Some(entry) => entry,
                None => {
                    self.logout();
                    return Ok(());
                },
            };

            match self.perform(entry) {
                Ok(()) => {},
                Err(Error::EndOfInput) => { return Err(Error::EndOfInput); },
                Err(e) => {
                    if e.is_recoverable() {
                        log::warn!("{} {:?} aborted: {}", &role, entry.label(), &e);
                    } else {
                        log::error!("{} {:?} failed: {}", &role, entry.label(), &e);
                    }
                    self.con.say(&e.to_string());
                },
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::tests::ensure_logging;

    use std::collections::VecDeque;
    use std::fs;

    use tempfile::TempDir;

    /// A `Console` that answers from a list and records the transcript.
    pub struct Script {
        input: VecDeque<String>,
        pub out: String,
    }

    impl Script {
        pub fn new(lines: &[&str]) -> Self {
            Self {
                input: lines.iter().map(|s| s.to_string()).collect(),
                out: String::new(),
            }
        }

        pub fn exhausted(&self) -> bool { self.input.is_empty() }
    }

    impl Console for Script {
        fn say(&mut self, text: &str) {
            self.out.push_str(text);
            self.out.push('\n');
        }

        fn ask(&mut self, prompt: &str) -> Result<String> {
            self.out.push_str(prompt);
            match self.input.pop_front() {
                Some(s) => {
                    self.out.push_str(&s);
                    self.out.push('\n');
                    Ok(s)
                },
                None => Err(Error::EndOfInput),
            }
        }
    }

    pub fn cfg_in(dir: &TempDir) -> Cfg {
        Cfg {
            patient_file: dir.path().join("patients.txt"),
            rights_file: dir.path().join("access_rights.txt"),
            ..Cfg::default()
        }
    }

    fn app(dir: &TempDir, lines: &[&str]) -> App<Script> {
        let a = App::new(cfg_in(dir), Script::new(lines));
        a.init().unwrap();
        a
    }

    const JANE: &str = "1|Jane Doe|30|F|1 Main St|5551234|\n";

    #[test]
    fn parse_helpers() {
        assert_eq!(parse_choice(" 2 ", 4).unwrap(), 2);
        assert!(parse_choice("0", 4).is_err());
        assert!(parse_choice("5", 4).is_err());
        assert!(parse_choice("two", 4).is_err());

        assert_eq!(parse_id("0").unwrap(), None);
        assert_eq!(parse_id("17").unwrap(), Some(17));
        assert!(parse_id("-1").is_err());

        assert_eq!(parse_text("  Jane Doe ", "Name", false).unwrap(), "Jane Doe");
        assert!(parse_text("Jane|Doe", "Name", false).is_err());
        assert!(parse_text("   ", "Name", false).is_err());
        assert_eq!(parse_text("", "Diagnosis", true).unwrap(), "");
    }

    #[test]
    fn register_jane() {
        ensure_logging();
        let dir = TempDir::new().unwrap();
        let mut a = app(&dir, &[
            "3", "reception", "reception123",
            "1", "Jane Doe", "30", "F", "1 Main St", "5551234", "",
            "3", "4",
        ]);
        a.run().unwrap();

        assert_eq!(a.session(), Session::LoggedOut);
        let all = a.store().load_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, 1);
        assert_eq!(all[0].name, "Jane Doe");
        assert!(a.console().out.contains("Patient registered successfully with ID: 1"));
        assert!(a.console().out.ends_with("Goodbye.\n"));
    }

    #[test]
    fn bad_credentials_stay_logged_out() {
        ensure_logging();
        let dir = TempDir::new().unwrap();
        let mut a = app(&dir, &[]);

        assert!(matches!(
            a.login(Role::Doctor, "doctor", "reception123"),
            Err(Error::InvalidCredentials)
        ));
        assert!(matches!(
            a.login(Role::Admin, "doctor", "doctor123"),
            Err(Error::InvalidCredentials)
        ));
        assert_eq!(a.session(), Session::LoggedOut);
        assert!(matches!(
            a.perform(MenuEntry::Act(Action::View)),
            Err(Error::InvalidInput(_))
        ));

        a.login(Role::Doctor, "doctor", "doctor123").unwrap();
        assert_eq!(a.session(), Session::LoggedIn(Role::Doctor));
        a.logout();
        assert_eq!(a.session(), Session::LoggedOut);
    }

    #[test]
    fn scripted_retry_after_bad_login() {
        ensure_logging();
        let dir = TempDir::new().unwrap();
        let mut a = app(&dir, &[
            "lots", "9",
            "2", "doctor", "nope",
            "2", "doctor", "doctor123",
            "1",
            "4", "4",
        ]);
        a.run().unwrap();

        let out = &a.console().out;
        assert!(out.contains("choose a number from 1 to 4."));
        assert!(out.contains("Invalid username or password."));
        assert!(out.contains("---Doctor---"));
        assert!(out.contains("No patients registered yet."));
        assert!(a.console().exhausted());
    }

    #[test]
    fn end_of_input_ends_cleanly() {
        ensure_logging();
        let dir = TempDir::new().unwrap();
        let mut a = app(&dir, &["2", "doctor", "doctor123", "2"]);
        fs::write(a.store().path(), JANE).unwrap();

        a.run().unwrap();
        assert_eq!(a.session(), Session::LoggedOut);
        assert_eq!(fs::read_to_string(a.store().path()).unwrap(), JANE);
    }

    #[test]
    fn disabled_update_is_denied() {
        ensure_logging();
        let dir = TempDir::new().unwrap();
        let mut a = app(&dir, &[
            "2", "doctor", "doctor123",
            "2",
            "4", "4",
        ]);
        fs::write(a.store().path(), JANE).unwrap();
        fs::write(a.rights().path(), "Doctor|1|0|1\nReceptionist|1|1\n").unwrap();

        a.run().unwrap();

        assert!(a.console().out.contains("Permission denied"));
        assert!(!a.console().out.contains("Current Diagnosis"));
        assert_eq!(fs::read_to_string(a.store().path()).unwrap(), JANE);
    }

    #[test]
    fn reenabling_lets_the_action_through() {
        ensure_logging();
        let dir = TempDir::new().unwrap();
        let mut a = app(&dir, &["1", "Flu"]);
        fs::write(a.store().path(), JANE).unwrap();
        fs::write(a.rights().path(), "Doctor|1|0|1\nReceptionist|1|1\n").unwrap();
        a.login(Role::Doctor, "doctor", "doctor123").unwrap();

        let before = fs::read(a.store().path()).unwrap();
        assert!(matches!(
            a.perform(MenuEntry::Act(Action::Update)),
            Err(Error::PermissionDenied { role: Role::Doctor, action: Action::Update })
        ));
        assert_eq!(fs::read(a.store().path()).unwrap(), before);
        assert!(a.console().out.is_empty());

        let mut r = a.rights().get_rights(Role::Doctor).unwrap();
        r.set(Action::Update, true).unwrap();
        a.rights().set_rights(&r).unwrap();

        a.perform(MenuEntry::Act(Action::Update)).unwrap();
        assert_eq!(a.store().find(1).unwrap().diagnosis, "Flu");
        assert!(a.console().exhausted());
    }

    #[test]
    fn admin_disables_registration() {
        ensure_logging();
        let dir = TempDir::new().unwrap();
        let mut a = app(&dir, &[
            "1", "admin", "admin123",
            "2", "N", "Y", "Y",
            "3",
            "3", "reception", "reception123",
            "1",
            "3", "4",
        ]);
        fs::write(a.store().path(), JANE).unwrap();
        let next_before = a.store().next_id().unwrap();

        a.run().unwrap();

        let out = &a.console().out;
        assert!(out.contains("Receptionist Current Status"));
        assert!(out.contains("Disable register? (Y/N): "));
        assert!(out.contains("Changes applied!"));
        assert!(out.contains("Permission denied"));
        assert!(!out.contains("Enter patient name"));

        assert_eq!(
            fs::read_to_string(a.rights().path()).unwrap(),
            "Doctor|1|1|1\nReceptionist|1|0\n"
        );
        assert_eq!(a.store().load_all().unwrap().len(), 1);
        assert_eq!(a.store().next_id().unwrap(), next_before);
    }

    #[test]
    fn receptionist_can_view() {
        ensure_logging();
        let dir = TempDir::new().unwrap();
        let mut a = app(&dir, &["3", "reception", "reception123", "2", "1", "3", "4"]);
        fs::write(a.store().path(), JANE).unwrap();

        a.run().unwrap();
        let out = &a.console().out;
        assert!(out.contains("ID: 1 - Name: Jane Doe"));
        assert!(out.contains("Diagnosis: No diagnosis"));
    }

    #[test]
    fn admin_has_no_record_access() {
        ensure_logging();
        let dir = TempDir::new().unwrap();
        let mut a = app(&dir, &[]);
        a.login(Role::Admin, "admin", "admin123").unwrap();

        assert!(matches!(
            a.perform(MenuEntry::Act(Action::Register)),
            Err(Error::InvalidInput(_))
        ));
        assert!(a.store().load_all().unwrap().is_empty());
    }

    #[test]
    fn view_unknown_id_reported() {
        ensure_logging();
        let dir = TempDir::new().unwrap();
        let mut a = app(&dir, &[
            "2", "doctor", "doctor123",
            "1", "5",
            "4", "4",
        ]);
        fs::write(a.store().path(), JANE).unwrap();

        a.run().unwrap();
        assert!(a.console().out.contains("Patient 5 not found."));
        assert!(a.console().out.contains("---Doctor---"));
    }

    #[test]
    fn corrupt_store_reported_not_fatal() {
        ensure_logging();
        let dir = TempDir::new().unwrap();
        let mut a = app(&dir, &[
            "2", "doctor", "doctor123",
            "1",
            "4", "4",
        ]);
        fs::write(a.store().path(), "1|Jane|x|F|a|1|\n").unwrap();

        a.run().unwrap();
        assert!(a.console().out.contains("Malformed record on line 1"));
        assert!(a.console().out.ends_with("Goodbye.\n"));
    }

    #[test]
    fn uncreatable_rights_file_is_fatal() {
        ensure_logging();
        let dir = TempDir::new().unwrap();
        let cfg = Cfg {
            rights_file: dir.path().join("no/such/dir/access_rights.txt"),
            ..cfg_in(&dir)
        };
        let a = App::new(cfg, Script::new(&[]));

        match a.init() {
            Err(e @ Error::Storage(_)) => {
                assert!(e.to_string().contains("Unable to initialize access rights"));
                assert!(!e.is_recoverable());
            },
            x => panic!("expected Storage error, got {:?}", x),
        }
        assert!(!a.rights().path().exists());
    }

    #[test]
    fn menus_render_from_role_data() {
        assert_eq!(
            role_menu_text(Role::Doctor),
            "\n---Doctor---\n1. View Patient Records\n2. Update Patient Record\n3. Delete Patient Record\n4. Back"
        );
        assert_eq!(
            role_menu_text(Role::Receptionist),
            "\n---Receptionist---\n1. Register Patient\n2. View Patient Records\n3. Back"
        );
        assert!(main_menu_text().ends_with("3. Receptionist\n4. Exit"));
    }
}
