//! In-memory collaborator fixtures for interceptor tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::result::Result;
use std::str::FromStr;

use dirsec::schema::well_known;
use dirsec::*;

// Directory layout shared by the tests.
pub const DOMAIN_DN: &str = "DC=example,DC=com";
pub const USERS_DN: &str = "CN=Users,DC=example,DC=com";
pub const ALICE_DN: &str = "CN=Alice,CN=Users,DC=example,DC=com";
pub const GROUP_DN: &str = "CN=Staff,CN=Users,DC=example,DC=com";
pub const SERVER_DN: &str = "CN=WebSrv01,CN=Users,DC=example,DC=com";

pub fn admin_sid() -> SID {
    SID::from_str("S-1-5-21-1-2-3-500").unwrap()
}

pub fn alice_sid() -> SID {
    SID::from_str("S-1-5-21-1-2-3-1104").unwrap()
}

pub fn bob_sid() -> SID {
    SID::from_str("S-1-5-21-1-2-3-1105").unwrap()
}

pub fn alice_token() -> SecurityToken {
    SecurityToken::new(vec![alice_sid()])
}

pub fn guid(n: u32) -> Guid {
    Guid {
        data1: 0x1000 + n,
        ..Guid::ZERO
    }
}

// Schema GUIDs the fixtures hand out.
pub const PERSONAL_INFO_SET: u32 = 1;
pub const DESCRIPTION_ATTR: u32 = 2;
pub const TELEPHONE_ATTR: u32 = 3;
pub const NAME_ATTR: u32 = 4;
pub const CN_ATTR: u32 = 5;
pub const USER_CLASS: u32 = 20;
pub const GROUP_CLASS: u32 = 21;
pub const CONTAINER_CLASS: u32 = 22;
pub const COMPUTER_CLASS: u32 = 23;
pub const DOMAIN_CLASS: u32 = 24;

pub struct TestSchema {
    attributes: HashMap<String, AttributeSchema>,
    classes: HashMap<String, Guid>,
    class_attributes: HashMap<String, Vec<String>>,
    inferiors: HashMap<String, Vec<String>>,
}

impl TestSchema {
    pub fn new() -> TestSchema {
        let mut schema = TestSchema {
            attributes: HashMap::new(),
            classes: HashMap::new(),
            class_attributes: HashMap::new(),
            inferiors: HashMap::new(),
        };

        let plain = AttributeFlags::new();
        schema.add_attr("description", guid(DESCRIPTION_ATTR), Some(guid(PERSONAL_INFO_SET)), plain);
        schema.add_attr("telephoneNumber", guid(TELEPHONE_ATTR), Some(guid(PERSONAL_INFO_SET)), plain);
        schema.add_attr("name", guid(NAME_ATTR), None, plain);
        schema.add_attr("cn", guid(CN_ATTR), None, plain);
        schema.add_attr("objectClass", guid(30), None, AttributeFlags::new().with_system_only(true));
        schema.add_attr("member", well_known::SELF_MEMBERSHIP, None, plain);
        schema.add_attr("servicePrincipalName", guid(31), None, plain);
        schema.add_attr("nTSecurityDescriptor", well_known::NT_SECURITY_DESCRIPTOR, None, plain);
        schema.add_attr("unicodePwd", guid(32), None, AttributeFlags::new().with_secret(true));
        schema.add_attr("dBCSPwd", guid(33), None, AttributeFlags::new().with_secret(true));
        schema.add_attr("clearTextPassword", guid(34), None, AttributeFlags::new().with_secret(true));

        schema.add_class("user", guid(USER_CLASS));
        schema.add_class("group", guid(GROUP_CLASS));
        schema.add_class("container", guid(CONTAINER_CLASS));
        schema.add_class("computer", guid(COMPUTER_CLASS));
        schema.add_class("domainDNS", guid(DOMAIN_CLASS));

        schema.class_attributes.insert(
            "user".to_string(),
            vec![
                "cn".to_string(),
                "description".to_string(),
                "telephoneNumber".to_string(),
            ],
        );
        schema.inferiors.insert(
            "container".to_string(),
            vec!["user".to_string(), "group".to_string(), "computer".to_string()],
        );

        schema
    }

    fn add_attr(&mut self, name: &str, guid: Guid, set: Option<Guid>, flags: AttributeFlags) {
        self.attributes.insert(
            name.to_ascii_lowercase(),
            AttributeSchema {
                guid,
                attribute_set: set,
                flags,
            },
        );
    }

    fn add_class(&mut self, name: &str, guid: Guid) {
        self.classes.insert(name.to_ascii_lowercase(), guid);
    }
}

impl SchemaCatalog for TestSchema {
    fn attribute(&self, name: &str) -> Result<AttributeSchema, SchemaError> {
        self.attributes
            .get(&name.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| SchemaError::UnknownAttribute(name.to_string()))
    }

    fn class_guid(&self, name: &str) -> Result<Guid, SchemaError> {
        self.classes
            .get(&name.to_ascii_lowercase())
            .copied()
            .ok_or_else(|| SchemaError::UnknownClass(name.to_string()))
    }

    fn class_attributes(&self, class: &str) -> Result<Vec<String>, SchemaError> {
        self.class_attributes
            .get(&class.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| SchemaError::UnknownClass(class.to_string()))
    }

    fn possible_inferiors(&self, class: &str) -> Result<Vec<String>, SchemaError> {
        self.inferiors
            .get(&class.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| SchemaError::UnknownClass(class.to_string()))
    }
}

#[derive(Clone)]
pub struct TestEntry {
    pub descriptor: Option<SecurityDescriptor>,
    pub object_class: String,
    pub parent: Option<String>,
    pub naming_context_root: bool,
    pub spn_identity: SpnIdentity,
}

pub struct TestStore {
    pub entries: HashMap<String, TestEntry>,
    pub dn_sids: HashMap<String, SID>,
}

impl TestStore {
    pub fn new() -> TestStore {
        let mut store = TestStore {
            entries: HashMap::new(),
            dn_sids: HashMap::new(),
        };
        store.put(DOMAIN_DN, "domainDNS", None, true, None);
        store.put(USERS_DN, "container", Some(DOMAIN_DN), false, None);
        store.put(ALICE_DN, "user", Some(USERS_DN), false, None);
        store.put(GROUP_DN, "group", Some(USERS_DN), false, None);
        store.put(SERVER_DN, "computer", Some(USERS_DN), false, None);

        store.dn_sids.insert(ALICE_DN.to_string(), alice_sid());
        store
            .dn_sids
            .insert(format!("CN=Bob,{}", USERS_DN), bob_sid());

        store
            .entry_mut(SERVER_DN)
            .spn_identity = SpnIdentity {
            account_name: "WEBSRV01$".to_string(),
            dns_host_name: Some("websrv01.example.com".to_string()),
            is_domain_controller: false,
            ntds_guid: None,
            forest_dns_name: None,
        };
        store
    }

    fn put(
        &mut self,
        dn: &str,
        class: &str,
        parent: Option<&str>,
        nc_root: bool,
        descriptor: Option<SecurityDescriptor>,
    ) {
        self.entries.insert(
            dn.to_string(),
            TestEntry {
                descriptor,
                object_class: class.to_string(),
                parent: parent.map(str::to_string),
                naming_context_root: nc_root,
                spn_identity: SpnIdentity::default(),
            },
        );
    }

    pub fn entry_mut(&mut self, dn: &str) -> &mut TestEntry {
        self.entries.get_mut(dn).expect("fixture entry")
    }

    pub fn set_descriptor(&mut self, dn: &str, descriptor: SecurityDescriptor) {
        self.entry_mut(dn).descriptor = Some(descriptor);
    }

    fn entry(&self, dn: &str) -> Result<&TestEntry, StoreError> {
        self.entries
            .get(dn)
            .ok_or_else(|| StoreError::NoSuchEntry(dn.to_string()))
    }
}

impl DirectoryStore for TestStore {
    fn security_descriptor(&self, dn: &str) -> Result<Option<SecurityDescriptor>, StoreError> {
        Ok(self.entry(dn)?.descriptor.clone())
    }

    fn parent_dn(&self, dn: &str) -> Result<Option<String>, StoreError> {
        // New entries are not in the store yet; derive the parent from the
        // DN string the way a real backend resolves the container.
        if let Ok(entry) = self.entry(dn) {
            return Ok(entry.parent.clone());
        }
        Ok(dn.split_once(',').map(|(_, parent)| parent.to_string()))
    }

    fn object_class(&self, dn: &str) -> Result<String, StoreError> {
        Ok(self.entry(dn)?.object_class.clone())
    }

    fn is_naming_context_root(&self, dn: &str) -> Result<bool, StoreError> {
        Ok(self
            .entries
            .get(dn)
            .map(|e| e.naming_context_root)
            .unwrap_or(false))
    }

    fn resolve_dn_sid(&self, dn: &str) -> Result<SID, StoreError> {
        self.dn_sids
            .get(dn)
            .cloned()
            .ok_or_else(|| StoreError::NoSuchEntry(dn.to_string()))
    }

    fn spn_identity(&self, dn: &str) -> Result<SpnIdentity, StoreError> {
        Ok(self.entry(dn)?.spn_identity.clone())
    }
}

/// Failing store used to check operational-error mapping.
pub struct BrokenStore;

impl DirectoryStore for BrokenStore {
    fn security_descriptor(&self, _dn: &str) -> Result<Option<SecurityDescriptor>, StoreError> {
        Err(StoreError::Unavailable("backend offline".to_string()))
    }

    fn parent_dn(&self, _dn: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable("backend offline".to_string()))
    }

    fn object_class(&self, _dn: &str) -> Result<String, StoreError> {
        Err(StoreError::Unavailable("backend offline".to_string()))
    }

    fn is_naming_context_root(&self, _dn: &str) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("backend offline".to_string()))
    }

    fn resolve_dn_sid(&self, _dn: &str) -> Result<SID, StoreError> {
        Err(StoreError::Unavailable("backend offline".to_string()))
    }

    fn spn_identity(&self, _dn: &str) -> Result<SpnIdentity, StoreError> {
        Err(StoreError::Unavailable("backend offline".to_string()))
    }
}

/// Records forwarded operations so tests can assert on pipeline behavior.
#[derive(Default)]
pub struct Recorder {
    pub forwarded: RefCell<Vec<Operation>>,
}

impl Recorder {
    pub fn count(&self) -> usize {
        self.forwarded.borrow().len()
    }

    pub fn last(&self) -> Option<Operation> {
        self.forwarded.borrow().last().cloned()
    }
}

impl NextLayer for &Recorder {
    fn forward(&self, operation: Operation) -> Result<(), StoreError> {
        self.forwarded.borrow_mut().push(operation);
        Ok(())
    }
}

// ACE/descriptor builders.

pub fn allow(sid: SID, mask: AccessMask) -> ACE {
    ACE::plain(AceType::AccessAllowed, mask, sid)
}

pub fn deny(sid: SID, mask: AccessMask) -> ACE {
    ACE::plain(AceType::AccessDenied, mask, sid)
}

pub fn allow_object(sid: SID, object_type: Guid, mask: AccessMask) -> ACE {
    ACE {
        ace_flags: AceFlags::new(),
        value: AceValue::AccessAllowedObject(ObjectAce {
            access_mask: mask,
            object_type: Some(object_type),
            inherited_object_type: None,
            sid,
        }),
    }
}

pub fn descriptor(aces: Vec<ACE>) -> SecurityDescriptor {
    SecurityDescriptor {
        owner_sid: Some(admin_sid()),
        group_sid: None,
        dacl: Some(ACL {
            acl_revision: AclRevision::DS,
            ace: aces,
        }),
        sacl: None,
    }
}
