//! Applications registered on the platform and the token details the
//! service API reports back for the calling credentials.

use serde_json::{json, Map, Value};

use crate::codec::{opt, Fields, Repr};
use crate::error::DecodeError;

#[derive(Debug, Clone, PartialEq)]
pub struct App {
    pub app_id: String,
    pub name: Option<String>,
    pub message_callback_url: Option<String>,
    pub metadata: Map<String, Value>,
    pub creation_ts: Option<i64>,
    pub last_update_ts: Option<i64>,
}

impl Repr for App {
    fn to_repr(&self) -> Value {
        json!({
            "appId": self.app_id,
            "name": opt(&self.name),
            "messageCallbackUrl": opt(&self.message_callback_url),
            "metadata": self.metadata,
            "_creationTs": opt(&self.creation_ts),
            "_lastUpdateTs": opt(&self.last_update_ts),
        })
    }

    fn from_repr(raw: &Value) -> Result<Self, DecodeError> {
        let fields = Fields::of("app", raw)?;
        Ok(Self {
            app_id: fields.str("appId")?,
            name: fields.opt_str("name")?,
            message_callback_url: fields.opt_str("messageCallbackUrl")?,
            metadata: fields.object("metadata")?,
            creation_ts: fields.opt_i64("_creationTs")?,
            last_update_ts: fields.opt_i64("_lastUpdateTs")?,
        })
    }
}

/// Who a token belongs to and what it may do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenDetails {
    pub profile_id: Option<String>,
    pub app_id: String,
    pub scopes: Vec<String>,
}

impl TokenDetails {
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }
}

impl Repr for TokenDetails {
    fn to_repr(&self) -> Value {
        json!({
            "profileId": opt(&self.profile_id),
            "appId": self.app_id,
            "scopes": self.scopes,
        })
    }

    fn from_repr(raw: &Value) -> Result<Self, DecodeError> {
        let fields = Fields::of("token details", raw)?;
        let scopes = fields
            .array("scopes")?
            .iter()
            .map(|scope| {
                scope.as_str().map(str::to_string).ok_or(DecodeError::InvalidType {
                    entity: "token details",
                    field: "scopes",
                    expected: "a list of strings",
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(Self {
            profile_id: fields.opt_str("profileId")?,
            app_id: fields.str("appId")?,
            scopes,
        })
    }
}
