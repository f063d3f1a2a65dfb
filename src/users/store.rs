//! 用户存储
//!
//! 进程内唯一持有并修改用户集合的组件。所有操作都返回 `Result`，
//! 不会 panic；如何映射为 HTTP 响应由处理器层决定。

use serde_json::Value;
use tracing::{debug, info};

use super::id::{is_canonical_uuid, IdGenerator};
use super::model::{is_truthy, parse_age, parse_hobbies, parse_username, User, UserField, UserPayload};

/// 生成的 ID 与现存记录冲突时的最大重试次数
const MAX_ID_ATTEMPTS: usize = 8;

/// 启动时写入的示例用户
const SAMPLE_USERS: [(&str, u32); 3] = [
    ("Miley Cyrus", 33),
    ("Chris Hemsworth", 40),
    ("Johnny Depp", 60),
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("用户 {id} 不存在")]
    NotFound { id: String },
    #[error("字段缺失或无效: {}", join_fields(.0))]
    InvalidFields(Vec<UserField>),
    #[error("连续 {attempts} 次生成的 ID 均与现有用户冲突")]
    IdExhausted { attempts: usize },
}

pub(crate) fn join_fields(fields: &[UserField]) -> String {
    fields
        .iter()
        .map(|field| field.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// 更新时的字段合并策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// 字段存在且不为 null 即覆盖
    #[default]
    Presence,
    /// 仅当 `username`/`age` 为 JavaScript 真值时覆盖，`age: 0` 会被忽略
    LegacyTruthy,
}

impl MergePolicy {
    pub fn from_legacy_flag(preserve_legacy_merge: bool) -> Self {
        if preserve_legacy_merge {
            MergePolicy::LegacyTruthy
        } else {
            MergePolicy::Presence
        }
    }

    fn supplied<'a>(self, value: Option<&'a Value>) -> Option<&'a Value> {
        match self {
            MergePolicy::Presence => value.filter(|v| !v.is_null()),
            MergePolicy::LegacyTruthy => value.filter(|v| is_truthy(v)),
        }
    }
}

pub struct UserStore {
    users: Vec<User>,
    ids: Box<dyn IdGenerator>,
    merge: MergePolicy,
}

impl std::fmt::Debug for UserStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserStore")
            .field("users", &self.users)
            .field("merge", &self.merge)
            .finish_non_exhaustive()
    }
}

impl UserStore {
    pub fn new(ids: Box<dyn IdGenerator>, merge: MergePolicy) -> Self {
        Self {
            users: Vec::new(),
            ids,
            merge,
        }
    }

    /// 追加三个示例用户
    pub fn seed_sample_users(&mut self) -> Result<(), StoreError> {
        for (username, age) in SAMPLE_USERS {
            let id = self.fresh_id()?;
            self.users.push(User {
                id,
                username: username.to_string(),
                age,
                hobbies: Vec::new(),
            });
        }
        info!("✅ 已初始化 {} 个示例用户", SAMPLE_USERS.len());
        Ok(())
    }

    pub fn merge_policy(&self) -> MergePolicy {
        self.merge
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// 按插入顺序返回全部用户
    pub fn list(&self) -> &[User] {
        &self.users
    }

    /// 精确匹配 ID，不校验格式
    pub fn get(&self, id: &str) -> Result<&User, StoreError> {
        self.users
            .iter()
            .find(|user| user.id == id)
            .ok_or_else(|| not_found(id))
    }

    pub fn create(&mut self, input: UserPayload) -> Result<User, StoreError> {
        let mut invalid = Vec::new();

        let username = input.username.as_ref().and_then(parse_username);
        if username.is_none() {
            invalid.push(UserField::Username);
        }
        let age = input.age.as_ref().and_then(parse_age);
        if age.is_none() {
            invalid.push(UserField::Age);
        }
        let hobbies = match input.hobbies.as_ref().filter(|v| !v.is_null()) {
            None => Some(Vec::new()),
            Some(value) => parse_hobbies(value),
        };
        if hobbies.is_none() {
            invalid.push(UserField::Hobbies);
        }

        let (Some(username), Some(age), Some(hobbies)) = (username, age, hobbies) else {
            return Err(StoreError::InvalidFields(invalid));
        };

        let user = User {
            id: self.fresh_id()?,
            username,
            age,
            hobbies,
        };
        self.users.push(user.clone());
        debug!(id = %user.id, "用户已创建");
        Ok(user)
    }

    /// 部分更新。先确认用户存在，再校验全部待写入字段，任何字段无效都不会修改记录。
    pub fn update(&mut self, id: &str, input: UserPayload) -> Result<User, StoreError> {
        let index = self.position(id)?;
        let mut invalid = Vec::new();

        let username = match self.merge.supplied(input.username.as_ref()) {
            None => None,
            Some(value) => {
                let parsed = parse_username(value);
                if parsed.is_none() {
                    invalid.push(UserField::Username);
                }
                parsed
            }
        };
        let age = match self.merge.supplied(input.age.as_ref()) {
            None => None,
            Some(value) => {
                let parsed = parse_age(value);
                if parsed.is_none() {
                    invalid.push(UserField::Age);
                }
                parsed
            }
        };
        // hobbies 在两种策略下都按"是否提供"处理，空数组也会覆盖
        let hobbies = match input.hobbies.as_ref().filter(|v| !v.is_null()) {
            None => None,
            Some(value) => {
                let parsed = parse_hobbies(value);
                if parsed.is_none() {
                    invalid.push(UserField::Hobbies);
                }
                parsed
            }
        };

        if !invalid.is_empty() {
            return Err(StoreError::InvalidFields(invalid));
        }

        let user = &mut self.users[index];
        if let Some(username) = username {
            user.username = username;
        }
        if let Some(age) = age {
            user.age = age;
        }
        if let Some(hobbies) = hobbies {
            user.hobbies = hobbies;
        }
        debug!(id = %user.id, "用户已更新");
        Ok(user.clone())
    }

    /// 删除后其余记录保持原有顺序
    pub fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        let index = self.position(id)?;
        self.users.remove(index);
        debug!(id, "用户已删除");
        Ok(())
    }

    fn position(&self, id: &str) -> Result<usize, StoreError> {
        self.users
            .iter()
            .position(|user| user.id == id)
            .ok_or_else(|| not_found(id))
    }

    fn fresh_id(&self) -> Result<String, StoreError> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.ids.next_id();
            debug_assert!(is_canonical_uuid(&id), "ID 生成器返回了非规范 UUID: {id}");
            if !self.users.iter().any(|user| user.id == id) {
                return Ok(id);
            }
        }
        Err(StoreError::IdExhausted {
            attempts: MAX_ID_ATTEMPTS,
        })
    }
}

fn not_found(id: &str) -> StoreError {
    StoreError::NotFound { id: id.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::id::UuidV4;
    use serde_json::json;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// 按顺序返回预设 ID，用完后重复最后一个
    struct ScriptedIds(Mutex<Vec<&'static str>>);

    impl ScriptedIds {
        fn new(mut ids: Vec<&'static str>) -> Self {
            ids.reverse();
            Self(Mutex::new(ids))
        }
    }

    impl IdGenerator for ScriptedIds {
        fn next_id(&self) -> String {
            let mut ids = self.0.lock().unwrap();
            if ids.len() > 1 {
                ids.pop().unwrap().to_string()
            } else {
                ids[0].to_string()
            }
        }
    }

    const ID_A: &str = "00000000-0000-4000-8000-00000000000a";
    const ID_B: &str = "00000000-0000-4000-8000-00000000000b";

    fn store() -> UserStore {
        UserStore::new(Box::new(UuidV4), MergePolicy::Presence)
    }

    fn legacy_store() -> UserStore {
        UserStore::new(Box::new(UuidV4), MergePolicy::LegacyTruthy)
    }

    fn payload(value: Value) -> UserPayload {
        UserPayload::from_json(value)
    }

    fn create(store: &mut UserStore, name: &str, age: u32) -> User {
        store
            .create(payload(json!({ "username": name, "age": age, "hobbies": [] })))
            .unwrap()
    }

    #[test]
    fn test_seed_sample_users() {
        let mut store = store();
        store.seed_sample_users().unwrap();

        let names: Vec<_> = store.list().iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, ["Miley Cyrus", "Chris Hemsworth", "Johnny Depp"]);
        assert!(store.list().iter().all(|u| u.hobbies.is_empty()));
        assert_eq!(store.list()[2].age, 60);
    }

    #[test]
    fn test_create_assigns_unique_canonical_ids() {
        let mut store = store();
        let mut seen = HashSet::new();
        for i in 1..=50 {
            let user = create(&mut store, &format!("user{i}"), i);
            assert!(is_canonical_uuid(&user.id));
            assert!(seen.insert(user.id));
        }
        assert_eq!(store.len(), 50);
    }

    #[test]
    fn test_create_returns_record() {
        let mut store = store();
        let user = store
            .create(payload(json!({ "username": "Ada", "age": 30, "hobbies": ["math"] })))
            .unwrap();

        assert_eq!(user.username, "Ada");
        assert_eq!(user.age, 30);
        assert_eq!(user.hobbies, vec!["math".to_string()]);
        assert_eq!(store.get(&user.id).unwrap(), &user);
    }

    #[test]
    fn test_create_defaults_hobbies() {
        let mut store = store();
        let user = store
            .create(payload(json!({ "username": "Ada", "age": 30 })))
            .unwrap();
        assert!(user.hobbies.is_empty());

        let user = store
            .create(payload(json!({ "username": "Bob", "age": 31, "hobbies": null })))
            .unwrap();
        assert!(user.hobbies.is_empty());
    }

    #[test]
    fn test_create_ignores_supplied_id() {
        let mut store = store();
        let user = store
            .create(payload(json!({ "id": ID_A, "username": "Ada", "age": 30 })))
            .unwrap();
        assert_ne!(user.id, ID_A);
    }

    #[test]
    fn test_create_reports_invalid_fields() {
        let mut store = store();

        let err = store.create(UserPayload::default()).unwrap_err();
        assert_eq!(
            err,
            StoreError::InvalidFields(vec![UserField::Username, UserField::Age])
        );

        let err = store
            .create(payload(json!({ "username": "", "age": 0, "hobbies": "chess" })))
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::InvalidFields(vec![UserField::Username, UserField::Age, UserField::Hobbies])
        );

        let err = store
            .create(payload(json!({ "username": "Ada", "age": "30" })))
            .unwrap_err();
        assert_eq!(err, StoreError::InvalidFields(vec![UserField::Age]));
        assert!(store.is_empty());
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let mut store = store();
        let a = create(&mut store, "a", 1);
        let b = create(&mut store, "b", 2);
        let c = create(&mut store, "c", 3);

        store
            .update(&a.id, payload(json!({ "username": "zzz" })))
            .unwrap();

        let ids: Vec<_> = store.list().iter().map(|u| u.id.clone()).collect();
        assert_eq!(ids, vec![a.id, b.id, c.id]);
    }

    #[test]
    fn test_get_unknown_id() {
        let mut store = store();
        create(&mut store, "a", 1);
        assert_eq!(
            store.get(ID_A).unwrap_err(),
            StoreError::NotFound { id: ID_A.to_string() }
        );
    }

    #[test]
    fn test_update_changes_only_supplied_fields() {
        let mut store = store();
        let user = store
            .create(payload(json!({ "username": "Ada", "age": 30, "hobbies": ["math"] })))
            .unwrap();

        let updated = store.update(&user.id, payload(json!({ "age": 31 }))).unwrap();
        assert_eq!(updated.age, 31);
        assert_eq!(updated.username, "Ada");
        assert_eq!(updated.hobbies, vec!["math".to_string()]);
        assert_eq!(store.get(&user.id).unwrap(), &updated);
    }

    #[test]
    fn test_update_with_empty_payload_changes_nothing() {
        let mut store = store();
        let user = create(&mut store, "Ada", 30);
        let updated = store.update(&user.id, UserPayload::default()).unwrap();
        assert_eq!(updated, user);
    }

    #[test]
    fn test_update_ignores_id_and_nulls() {
        let mut store = store();
        let user = create(&mut store, "Ada", 30);
        let updated = store
            .update(
                &user.id,
                payload(json!({ "id": ID_B, "username": null, "age": null, "hobbies": null })),
            )
            .unwrap();
        assert_eq!(updated, user);
    }

    #[test]
    fn test_update_replaces_hobbies_with_empty_list() {
        let mut store = store();
        let user = store
            .create(payload(json!({ "username": "Ada", "age": 30, "hobbies": ["math"] })))
            .unwrap();
        let updated = store
            .update(&user.id, payload(json!({ "hobbies": [] })))
            .unwrap();
        assert!(updated.hobbies.is_empty());
    }

    #[test]
    fn test_update_presence_rejects_falsy_values() {
        let mut store = store();
        let user = create(&mut store, "Ada", 30);

        let err = store
            .update(&user.id, payload(json!({ "username": "Grace", "age": 0 })))
            .unwrap_err();
        assert_eq!(err, StoreError::InvalidFields(vec![UserField::Age]));
        // 无部分写入
        assert_eq!(store.get(&user.id).unwrap(), &user);
    }

    #[test]
    fn test_update_legacy_ignores_falsy_values() {
        let mut store = legacy_store();
        let user = create(&mut store, "Ada", 30);

        let updated = store
            .update(&user.id, payload(json!({ "username": "", "age": 0 })))
            .unwrap();
        assert_eq!(updated, user);

        let updated = store
            .update(&user.id, payload(json!({ "username": "Grace", "age": 0 })))
            .unwrap();
        assert_eq!(updated.username, "Grace");
        assert_eq!(updated.age, 30);
    }

    #[test]
    fn test_update_legacy_still_validates_truthy_values() {
        let mut store = legacy_store();
        let user = create(&mut store, "Ada", 30);
        let err = store
            .update(&user.id, payload(json!({ "age": "old" })))
            .unwrap_err();
        assert_eq!(err, StoreError::InvalidFields(vec![UserField::Age]));
    }

    #[test]
    fn test_update_unknown_id_checked_before_payload() {
        let mut store = store();
        let err = store
            .update(ID_A, payload(json!({ "age": "invalid" })))
            .unwrap_err();
        assert_eq!(err, StoreError::NotFound { id: ID_A.to_string() });
    }

    #[test]
    fn test_delete_preserves_order_of_rest() {
        let mut store = store();
        let a = create(&mut store, "a", 1);
        let b = create(&mut store, "b", 2);
        let c = create(&mut store, "c", 3);

        store.delete(&b.id).unwrap();

        let ids: Vec<_> = store.list().iter().map(|u| u.id.clone()).collect();
        assert_eq!(ids, vec![a.id, c.id]);
        assert!(matches!(store.get(&b.id), Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn test_delete_twice_is_not_found() {
        let mut store = store();
        let user = create(&mut store, "a", 1);

        assert_eq!(store.delete(&user.id), Ok(()));
        assert!(matches!(store.delete(&user.id), Err(StoreError::NotFound { .. })));
        assert!(matches!(store.delete(&user.id), Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn test_fresh_id_retries_on_collision() {
        let mut store = UserStore::new(
            Box::new(ScriptedIds::new(vec![ID_A, ID_A, ID_B])),
            MergePolicy::Presence,
        );
        let first = create(&mut store, "a", 1);
        let second = create(&mut store, "b", 2);
        assert_eq!(first.id, ID_A);
        assert_eq!(second.id, ID_B);
    }

    #[test]
    fn test_fresh_id_gives_up_after_bounded_attempts() {
        let mut store = UserStore::new(
            Box::new(ScriptedIds::new(vec![ID_A])),
            MergePolicy::Presence,
        );
        create(&mut store, "a", 1);
        let err = store
            .create(payload(json!({ "username": "b", "age": 2 })))
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::IdExhausted {
                attempts: MAX_ID_ATTEMPTS
            }
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_error_messages_name_fields() {
        let err = StoreError::InvalidFields(vec![UserField::Username, UserField::Hobbies]);
        assert_eq!(err.to_string(), "字段缺失或无效: username, hobbies");
    }
}
