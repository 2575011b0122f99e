//! Metadata-only modifiers

use crate::fdef::{
    DeleteRule, EnumInput, EnumOutput, Fdef, FieldStorage, FieldUsage, Nullability, ReadRule,
    Strictness, WriteRule,
};
use crate::modifier::Modifier;

/// Modifier whose only effect is on the field definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Marker {
    Primary,
    ReadOnly,
    WriteOnly,
    ReadWrite,
    WriteOnce,
    WriteNonnull,
    Internal,
    Temp,
    Index,
    Unique,
    Embedded,
    LinkTo,
    LinkedBy(String),
    LinkedThru(String),
    LinkedIn(String),
    Referrer(String),
    Referee(String),
    Delete(DeleteRule),
    Strictness(Strictness),
    EnumInput(EnumInput),
    EnumOutput(EnumOutput),
    Nullable,
    Usage(FieldUsage),
}

impl Modifier for Marker {
    fn define(&self, fdef: &mut Fdef) {
        match self {
            Self::Primary => fdef.primary = true,
            Self::ReadOnly => fdef.write_rule = WriteRule::NoWrite,
            Self::WriteOnly => fdef.read_rule = ReadRule::NoRead,
            Self::ReadWrite => {
                fdef.read_rule = ReadRule::Readable;
                fdef.write_rule = WriteRule::Writable;
            }
            Self::WriteOnce => fdef.write_rule = WriteRule::WriteOnce,
            Self::WriteNonnull => fdef.write_rule = WriteRule::WriteNonnull,
            Self::Internal => {
                fdef.read_rule = ReadRule::NoRead;
                fdef.write_rule = WriteRule::NoWrite;
            }
            Self::Temp => fdef.storage = FieldStorage::Temp,
            Self::Index => fdef.index = true,
            Self::Unique => fdef.unique = true,
            Self::Embedded => fdef.storage = FieldStorage::Embedded,
            Self::LinkTo => fdef.storage = FieldStorage::LocalKey,
            Self::LinkedBy(key) => {
                fdef.storage = FieldStorage::ForeignKey;
                fdef.foreign_key = Some(key.clone());
            }
            Self::LinkedThru(key) => {
                fdef.storage = FieldStorage::ForeignKey;
                fdef.foreign_key = Some(key.clone());
                fdef.use_join_table = true;
                fdef.delete_rule.get_or_insert(DeleteRule::Nullify);
            }
            Self::LinkedIn(class) => {
                fdef.storage = FieldStorage::ForeignKey;
                fdef.join_class = Some(class.clone());
                fdef.use_join_table = true;
                fdef.delete_rule.get_or_insert(DeleteRule::Nullify);
            }
            Self::Referrer(key) => fdef.referrer_key = Some(key.clone()),
            Self::Referee(key) => fdef.referee_key = Some(key.clone()),
            Self::Delete(rule) => fdef.delete_rule = Some(*rule),
            Self::Strictness(strictness) => fdef.strictness = *strictness,
            Self::EnumInput(input) => fdef.enum_input = Some(*input),
            Self::EnumOutput(output) => fdef.enum_output = Some(*output),
            Self::Nullable => fdef.item_nullability = Nullability::Nullable,
            Self::Usage(usage) => fdef.usage = Some(*usage),
        }
    }
}
