use core::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use thiserror::Error;

const TGS_NAME: &str = "krbtgt";

/// A Kerberos realm, compared byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Realm(SmolStr);

impl Realm {
    pub fn new(name: impl AsRef<str>) -> Self {
        Realm(SmolStr::new(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Realm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Realm {
    fn from(name: &str) -> Self {
        Realm::new(name)
    }
}

/// [RFC 4120 6.2](https://www.rfc-editor.org/rfc/rfc4120.txt) principal name types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum NameType {
    Unknown = 0,
    Principal = 1,
    SrvInst = 2,
    SrvHst = 3,
    Enterprise = 10,
}

impl NameType {
    pub fn value(self) -> i32 {
        self as i32
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpnParseError {
    #[error("principal name is empty")]
    Empty,
    #[error("principal name has an empty component")]
    EmptyComponent,
    #[error("realm part after '@' is empty")]
    EmptyRealm,
}

/// A principal name: name type, `/`-separated components, and the realm the
/// name lives in. Two names are equal only when all three parts are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrincipalName {
    name_type: NameType,
    name_strings: Vec<String>,
    realm: Realm,
}

impl PrincipalName {
    pub fn new(name_type: NameType, name_strings: Vec<String>, realm: Realm) -> Self {
        PrincipalName {
            name_type,
            name_strings,
            realm,
        }
    }

    /// The TGS principal `krbtgt/<target>@<issuing>`: a ticket for it is a TGT
    /// granting entry into `target`, issued by the KDC of `issuing`.
    pub fn tgs_service(target: &Realm, issuing: &Realm) -> Self {
        PrincipalName {
            name_type: NameType::SrvInst,
            name_strings: vec![TGS_NAME.to_owned(), target.as_str().to_owned()],
            realm: issuing.clone(),
        }
    }

    /// Parses `svc/host` or `svc/host@REALM`; a missing realm falls back to
    /// `default_realm`.
    pub fn parse_spn(spn: &str, default_realm: &Realm) -> Result<Self, SpnParseError> {
        let (name, realm) = match spn.rsplit_once('@') {
            Some((_, realm)) if realm.is_empty() => return Err(SpnParseError::EmptyRealm),
            Some((name, realm)) => (name, Realm::new(realm)),
            None => (spn, default_realm.clone()),
        };

        if name.is_empty() {
            return Err(SpnParseError::Empty);
        }

        let name_strings: Vec<String> = name.split('/').map(str::to_owned).collect();

        if name_strings.iter().any(String::is_empty) {
            return Err(SpnParseError::EmptyComponent);
        }

        let name_type = if name_strings.len() > 1 {
            NameType::SrvInst
        } else {
            NameType::Principal
        };

        Ok(PrincipalName {
            name_type,
            name_strings,
            realm,
        })
    }

    pub fn name_type(&self) -> NameType {
        self.name_type
    }

    pub fn name_strings(&self) -> &[String] {
        &self.name_strings
    }

    pub fn realm(&self) -> &Realm {
        &self.realm
    }

    /// The same name relocated into another realm.
    pub fn with_realm(&self, realm: Realm) -> Self {
        PrincipalName {
            name_type: self.name_type,
            name_strings: self.name_strings.clone(),
            realm,
        }
    }

    /// For a TGS-shaped name (`krbtgt/<realm>`, exactly two components), the
    /// realm the corresponding TGT grants entry into.
    pub fn tgs_target_realm(&self) -> Option<Realm> {
        match self.name_strings.as_slice() {
            [service, target] if service == TGS_NAME => Some(Realm::new(target)),
            _ => None,
        }
    }
}

impl fmt::Display for PrincipalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name_strings.join("/"), self.realm)
    }
}
