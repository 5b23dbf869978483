use shared::domain::{Contact, LearningCenter};
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    Phone,
    Email,
    Website,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Ios,
    Android,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("no {0:?} contact available")]
    Missing(ContactKind),
    #[error("invalid link: {0}")]
    Invalid(#[from] url::ParseError),
}

pub fn available_contacts(contact: &Contact) -> Vec<ContactKind> {
    [
        (ContactKind::Phone, &contact.phone),
        (ContactKind::Email, &contact.email),
        (ContactKind::Website, &contact.website),
    ]
    .into_iter()
    .filter(|(_, value)| value.as_deref().is_some_and(|v| !v.trim().is_empty()))
    .map(|(kind, _)| kind)
    .collect()
}

pub fn contact_url(contact: &Contact, kind: ContactKind) -> Result<Url, LinkError> {
    let value = match kind {
        ContactKind::Phone => &contact.phone,
        ContactKind::Email => &contact.email,
        ContactKind::Website => &contact.website,
    }
    .as_deref()
    .map(str::trim)
    .filter(|v| !v.is_empty())
    .ok_or(LinkError::Missing(kind))?;

    let url = match kind {
        ContactKind::Phone => {
            let digits: String = value
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '+')
                .collect();
            Url::parse(&format!("tel:{digits}"))?
        }
        ContactKind::Email => Url::parse(&format!("mailto:{value}"))?,
        ContactKind::Website => website_url(value)?,
    };
    Ok(url)
}

/// Bare hosts such as `www.example.org` are opened over https.
fn website_url(value: &str) -> Result<Url, url::ParseError> {
    match Url::parse(value) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("https://{value}")),
        Err(err) => Err(err),
    }
}

/// `maps:0,0?q=<name>@<lat>,<lng>` on iOS, `geo:0,0?q=<lat>,<lng>(<name>)`
/// on Android.
pub fn directions_url(center: &LearningCenter, platform: Platform) -> Result<Url, LinkError> {
    let latitude = center.coordinates.latitude;
    let longitude = center.coordinates.longitude;
    let (base, query) = match platform {
        Platform::Ios => ("maps:0,0", format!("q={}@{latitude},{longitude}", center.name)),
        Platform::Android => ("geo:0,0", format!("q={latitude},{longitude}({})", center.name)),
    };
    let mut url = Url::parse(base)?;
    url.set_query(Some(&query));
    Ok(url)
}
