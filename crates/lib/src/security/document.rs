//! Typed view of a database security document and its in-memory transforms.
//!
//! The transforms are pure: they only touch the document they are given and report
//! whether anything was added or removed. Fields this crate does not know about are
//! carried through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::util::NameList;

/// The `_security` document of a database.
///
/// `admins` and `members` may be absent in stored documents; absence is read as empty.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Revision the document was read at, used to guard the write back
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admins: Option<SecurityGroup>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<SecurityGroup>,

    /// Any other fields present on the stored document
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Names and roles of one access level (`admins` or `members`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub names: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SecurityGroup {
    /// A group with empty `names` and `roles`.
    pub fn empty() -> Self {
        Self {
            names: Some(Vec::new()),
            roles: Some(Vec::new()),
            extra: Map::new(),
        }
    }

    pub fn names(&self) -> &[String] {
        self.names.as_deref().unwrap_or_default()
    }

    pub fn roles(&self) -> &[String] {
        self.roles.as_deref().unwrap_or_default()
    }

    fn names_mut(&mut self) -> &mut Vec<String> {
        self.names.get_or_insert_with(Vec::new)
    }

    fn roles_mut(&mut self) -> &mut Vec<String> {
        self.roles.get_or_insert_with(Vec::new)
    }
}

impl SecurityDocument {
    pub fn admin_names(&self) -> &[String] {
        self.admins.as_ref().map(SecurityGroup::names).unwrap_or_default()
    }

    pub fn admin_roles(&self) -> &[String] {
        self.admins.as_ref().map(SecurityGroup::roles).unwrap_or_default()
    }

    pub fn member_names(&self) -> &[String] {
        self.members.as_ref().map(SecurityGroup::names).unwrap_or_default()
    }

    pub fn member_roles(&self) -> &[String] {
        self.members.as_ref().map(SecurityGroup::roles).unwrap_or_default()
    }

    fn admins_mut(&mut self) -> &mut SecurityGroup {
        self.admins.get_or_insert_with(SecurityGroup::empty)
    }

    fn members_mut(&mut self) -> &mut SecurityGroup {
        self.members.get_or_insert_with(SecurityGroup::empty)
    }

    /// Fill in missing `admins`, `admins.roles`, `members`, `members.roles` and `members.names`.
    ///
    /// Each structure is defaulted on its own; existing entries are never touched.
    pub fn normalize(&mut self) {
        self.admins_mut().roles_mut();
        let members = self.members_mut();
        members.roles_mut();
        members.names_mut();
    }

    /// Append each admin role and member role that is not already listed.
    ///
    /// # Returns
    /// `true` if at least one role was added.
    pub fn ensure_roles(&mut self, admin_roles: &NameList, member_roles: &NameList) -> bool {
        self.normalize();
        let admins_changed = union_into(self.admins_mut().roles_mut(), admin_roles);
        let members_changed = union_into(self.members_mut().roles_mut(), member_roles);
        admins_changed || members_changed
    }

    /// Append each key that is not already a member name.
    ///
    /// # Returns
    /// `true` if at least one name was added.
    pub fn authorize(&mut self, keys: &NameList) -> bool {
        self.normalize();
        union_into(self.members_mut().names_mut(), keys)
    }

    /// Remove the first occurrence of each key from the member names.
    ///
    /// A document without `members.names` is left as it is.
    ///
    /// # Returns
    /// `true` if at least one name was removed.
    pub fn deauthorize(&mut self, keys: &NameList) -> bool {
        let Some(names) = self.members.as_mut().and_then(|m| m.names.as_mut()) else {
            return false;
        };
        let mut changed = false;
        for key in keys {
            if let Some(index) = names.iter().position(|name| name == key) {
                names.remove(index);
                changed = true;
            }
        }
        if changed {
            self.normalize();
        }
        changed
    }
}

/// Append the items missing from `list`, in input order.
fn union_into(list: &mut Vec<String>, items: &NameList) -> bool {
    let mut changed = false;
    for item in items {
        if !list.contains(item) {
            list.push(item.clone());
            changed = true;
        }
    }
    changed
}
