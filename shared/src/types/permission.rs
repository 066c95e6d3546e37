use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Permission code vocabulary
// ---------------------------------------------------------------------------

/// String constants for every permission code the backend issues.
pub mod codes {
    pub const READ_PRODUCTS: &str = "READ_PRODUCTS";
    pub const WRITE_PRODUCTS: &str = "WRITE_PRODUCTS";
    pub const DELETE_PRODUCTS: &str = "DELETE_PRODUCTS";
    pub const MANAGE_PRODUCTS: &str = "MANAGE_PRODUCTS";

    pub const READ_ORDERS: &str = "READ_ORDERS";
    pub const UPDATE_ORDERS: &str = "UPDATE_ORDERS";
    pub const CANCEL_ORDERS: &str = "CANCEL_ORDERS";
    pub const MANAGE_ORDERS: &str = "MANAGE_ORDERS";

    pub const READ_CUSTOMERS: &str = "READ_CUSTOMERS";
    pub const WRITE_CUSTOMERS: &str = "WRITE_CUSTOMERS";
    pub const DELETE_CUSTOMERS: &str = "DELETE_CUSTOMERS";
    pub const MANAGE_CUSTOMERS: &str = "MANAGE_CUSTOMERS";

    pub const READ_CATEGORIES: &str = "READ_CATEGORIES";
    pub const WRITE_CATEGORIES: &str = "WRITE_CATEGORIES";
    pub const DELETE_CATEGORIES: &str = "DELETE_CATEGORIES";
    pub const MANAGE_CATEGORIES: &str = "MANAGE_CATEGORIES";

    pub const READ_BLOGS: &str = "READ_BLOGS";
    pub const WRITE_BLOGS: &str = "WRITE_BLOGS";
    pub const DELETE_BLOGS: &str = "DELETE_BLOGS";
    pub const MANAGE_BLOGS: &str = "MANAGE_BLOGS";

    pub const READ_SLIDERS: &str = "READ_SLIDERS";
    pub const WRITE_SLIDERS: &str = "WRITE_SLIDERS";
    pub const DELETE_SLIDERS: &str = "DELETE_SLIDERS";
    pub const MANAGE_SLIDERS: &str = "MANAGE_SLIDERS";

    pub const READ_ROLES: &str = "READ_ROLES";
    pub const WRITE_ROLES: &str = "WRITE_ROLES";
    pub const DELETE_ROLES: &str = "DELETE_ROLES";
    pub const MANAGE_ROLES: &str = "MANAGE_ROLES";

    pub const READ_PERMISSIONS: &str = "READ_PERMISSIONS";
    pub const WRITE_PERMISSIONS: &str = "WRITE_PERMISSIONS";
    pub const DELETE_PERMISSIONS: &str = "DELETE_PERMISSIONS";
    pub const MANAGE_PERMISSIONS: &str = "MANAGE_PERMISSIONS";

    pub const READ_USERS: &str = "READ_USERS";
    pub const WRITE_USERS: &str = "WRITE_USERS";
    pub const DELETE_USERS: &str = "DELETE_USERS";
    pub const MANAGE_USERS: &str = "MANAGE_USERS";

    // Analytics does not follow ACTION_RESOURCE: there is no READ_REPORTS and
    // MANAGE_REPORTS does not imply VIEW_STATISTICS. Check these codes with
    // plain membership queries only.
    pub const VIEW_REPORTS: &str = "VIEW_REPORTS";
    pub const VIEW_STATISTICS: &str = "VIEW_STATISTICS";
    pub const MANAGE_REPORTS: &str = "MANAGE_REPORTS";

    pub const ANALYTICS_GROUP: [&str; 3] = [VIEW_REPORTS, VIEW_STATISTICS, MANAGE_REPORTS];
}

// ---------------------------------------------------------------------------
// Typed resource + action
// ---------------------------------------------------------------------------

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown name: {0}")]
pub struct UnknownName(pub String);

/// Closed set of resources that follow the `ACTION_RESOURCE` /
/// `MANAGE_RESOURCE` naming convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Resource {
    Products,
    Orders,
    Customers,
    Categories,
    Blogs,
    Sliders,
    Roles,
    Permissions,
    Users,
}

impl Resource {
    pub const ALL: [Resource; 9] = [
        Resource::Products,
        Resource::Orders,
        Resource::Customers,
        Resource::Categories,
        Resource::Blogs,
        Resource::Sliders,
        Resource::Roles,
        Resource::Permissions,
        Resource::Users,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Products => "PRODUCTS",
            Resource::Orders => "ORDERS",
            Resource::Customers => "CUSTOMERS",
            Resource::Categories => "CATEGORIES",
            Resource::Blogs => "BLOGS",
            Resource::Sliders => "SLIDERS",
            Resource::Roles => "ROLES",
            Resource::Permissions => "PERMISSIONS",
            Resource::Users => "USERS",
        }
    }

    /// `MANAGE_<RESOURCE>`, the code that implies every action on it.
    pub fn manage_code(&self) -> String {
        format!("MANAGE_{}", self.as_str())
    }

    /// `<ACTION>_<RESOURCE>`.
    pub fn code(&self, action: Action) -> String {
        format!("{}_{}", action.as_str(), self.as_str())
    }

    /// The actions the backend actually issues codes for on this resource.
    /// Orders are updated and cancelled rather than written and deleted.
    pub fn actions(&self) -> [Action; 3] {
        match self {
            Resource::Orders => [Action::Read, Action::Update, Action::Cancel],
            _ => [Action::Read, Action::Write, Action::Delete],
        }
    }

    /// Every code in this resource's permission group, MANAGE last.
    pub fn group(&self) -> Vec<String> {
        let mut group: Vec<String> = self.actions().iter().map(|a| self.code(*a)).collect();
        group.push(self.manage_code());
        group
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownName(s.to_string()))
    }
}

/// Specific actions. `MANAGE` is deliberately absent: it is the superset
/// code, computed by [`Resource::manage_code`], never an action on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Read,
    Write,
    Update,
    Delete,
    Cancel,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Read,
        Action::Write,
        Action::Update,
        Action::Delete,
        Action::Cancel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "READ",
            Action::Write => "WRITE",
            Action::Update => "UPDATE",
            Action::Delete => "DELETE",
            Action::Cancel => "CANCEL",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| UnknownName(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// PermissionSet
// ---------------------------------------------------------------------------

/// Flat set of permission codes carried by an identity.
///
/// Membership is the only question it answers; order and duplicates in the
/// source list are irrelevant. There is no way to add or remove a code once
/// built, so a new permission set means a new login.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet(HashSet<String>);

impl PermissionSet {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(codes.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, code: &str) -> bool {
        self.0.contains(code)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Sorted copy, for stable JSON output.
    pub fn to_vec(&self) -> Vec<String> {
        let mut v: Vec<String> = self.0.iter().cloned().collect();
        v.sort();
        v
    }
}

impl<S: Into<String>> FromIterator<S> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl Serialize for PermissionSet {
    fn serialize<Ser: serde::Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        self.to_vec().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PermissionSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let codes = Vec::<String>::deserialize(deserializer)?;
        Ok(Self::new(codes))
    }
}
