/*!
Operator roles and the actions the access-rights file gates.

Everything that differs between roles (which actions they have, in what
order their flags sit in the rights file, what their menu offers) is data
hung off `Role`, so nothing else has to ask "which kind of operator is
this?".
*/
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    View,
    Update,
    Delete,
    Register,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::View     => "view",
            Action::Update   => "update",
            Action::Delete   => "delete",
            Action::Register => "register",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One line of a role's menu, not counting the trailing "Back".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuEntry {
    /// Perform a gated action on the record store.
    Act(Action),
    /// Edit another role's access rights (Admin only).
    Manage(Role),
}

impl MenuEntry {
    pub fn label(&self) -> &'static str {
        match self {
            MenuEntry::Act(Action::View) => "View Patient Records",
            MenuEntry::Act(Action::Update) => "Update Patient Record",
            MenuEntry::Act(Action::Delete) => "Delete Patient Record",
            MenuEntry::Act(Action::Register) => "Register Patient",
            MenuEntry::Manage(Role::Doctor) => "Manage doctor's menu",
            MenuEntry::Manage(Role::Receptionist) => "Manage receptionist's menu",
            MenuEntry::Manage(Role::Admin) => "Manage admin's menu",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Doctor,
    Receptionist,
}

static DOCTOR_ACTIONS: &[Action] = &[Action::View, Action::Update, Action::Delete];
static RECEPTIONIST_ACTIONS: &[Action] = &[Action::View, Action::Register];

static ADMIN_MENU: &[MenuEntry] = &[
    MenuEntry::Manage(Role::Doctor),
    MenuEntry::Manage(Role::Receptionist),
];
static DOCTOR_MENU: &[MenuEntry] = &[
    MenuEntry::Act(Action::View),
    MenuEntry::Act(Action::Update),
    MenuEntry::Act(Action::Delete),
];
static RECEPTIONIST_MENU: &[MenuEntry] = &[
    MenuEntry::Act(Action::Register),
    MenuEntry::Act(Action::View),
];

impl Role {
    /// In main-menu order.
    pub const ALL: [Role; 3] = [Role::Admin, Role::Doctor, Role::Receptionist];

    /// Roles that have a line in the rights file.
    pub const GATED: [Role; 2] = [Role::Doctor, Role::Receptionist];

    /// The role's gated actions, in the order their flags appear in the
    /// rights file. This is the only place that order is written down.
    pub fn actions(&self) -> &'static [Action] {
        match self {
            Role::Admin => &[],
            Role::Doctor => DOCTOR_ACTIONS,
            Role::Receptionist => RECEPTIONIST_ACTIONS,
        }
    }

    pub fn menu(&self) -> &'static [MenuEntry] {
        match self {
            Role::Admin => ADMIN_MENU,
            Role::Doctor => DOCTOR_MENU,
            Role::Receptionist => RECEPTIONIST_MENU,
        }
    }

    /// Menu number that logs out ("Back").
    pub fn logout_index(&self) -> usize { self.menu().len() + 1 }

    /// Resolve a 1-based menu choice. `None` means logout; anything out of
    /// range is an error message for the operator.
    pub fn menu_choice(&self, n: usize) -> Result<Option<MenuEntry>, String> {
        if n == self.logout_index() {
            Ok(None)
        } else if n >= 1 && n <= self.menu().len() {
            Ok(Some(self.menu()[n - 1]))
        } else {
            Err(format!(
                "choose a number from 1 to {}.", self.logout_index()
            ))
        }
    }

    pub fn has_action(&self, action: Action) -> bool {
        self.actions().contains(&action)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let token = match self {
            Role::Admin        => "Admin",
            Role::Doctor       => "Doctor",
            Role::Receptionist => "Receptionist",
        };

        write!(f, "{}", token)
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin"        => Ok(Role::Admin),
            "Doctor"       => Ok(Role::Doctor),
            "Receptionist" => Ok(Role::Receptionist),
            _ => Err(format!("{:?} is not a valid Role.", s)),
        }
    }
}
