//! Minimal ARN parsing

const ARN_PREFIX: &str = "arn";

/// The six sections of an Amazon Resource Name
///
/// `arn:partition:service:region:account-id:resource`; the resource keeps any
/// further colons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arn<'a> {
    pub partition: &'a str,
    pub service: &'a str,
    pub region: &'a str,
    pub account_id: &'a str,
    pub resource: &'a str,
}

impl<'a> Arn<'a> {
    /// Split `value` into its ARN sections, or `None` if it is not shaped like an ARN
    pub fn parse(value: &'a str) -> Option<Self> {
        let mut sections = value.splitn(6, ':');
        if sections.next()? != ARN_PREFIX {
            return None;
        }
        Some(Self {
            partition: sections.next()?,
            service: sections.next()?,
            region: sections.next()?,
            account_id: sections.next()?,
            resource: sections.next()?,
        })
    }
}

pub fn is_arn(value: &str) -> bool {
    Arn::parse(value).is_some()
}
