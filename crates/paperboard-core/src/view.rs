//! Host-independent display model for one paper.

use std::fmt;

use crate::{Paper, PublicationStatus};

/// Abstract page for an arXiv id.
pub fn abstract_url(id: &str) -> String {
    format!("https://arxiv.org/abs/{id}")
}

/// Styling class for a venue badge, picked by keyword in the venue name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VenueBadge {
    Neurips,
    Iclr,
    Icml,
    Cvpr,
    Iccv,
    Eccv,
    Acl,
    Emnlp,
    Naacl,
    Aaai,
    Ijcai,
    Published,
}

impl VenueBadge {
    /// First matching keyword wins, so a venue containing `ACL` (including
    /// `NAACL`) gets the ACL badge.
    pub fn for_venue(venue: &str) -> Self {
        const KEYWORDS: &[(&str, VenueBadge)] = &[
            ("NEURIPS", VenueBadge::Neurips),
            ("ICLR", VenueBadge::Iclr),
            ("ICML", VenueBadge::Icml),
            ("CVPR", VenueBadge::Cvpr),
            ("ICCV", VenueBadge::Iccv),
            ("ECCV", VenueBadge::Eccv),
            ("ACL", VenueBadge::Acl),
            ("EMNLP", VenueBadge::Emnlp),
            ("NAACL", VenueBadge::Naacl),
            ("AAAI", VenueBadge::Aaai),
            ("IJCAI", VenueBadge::Ijcai),
        ];
        let upper = venue.to_uppercase();
        KEYWORDS
            .iter()
            .find(|(kw, _)| upper.contains(kw))
            .map_or(VenueBadge::Published, |(_, badge)| *badge)
    }

    pub fn class(self) -> &'static str {
        match self {
            Self::Neurips => "badge-neurips",
            Self::Iclr => "badge-iclr",
            Self::Icml => "badge-icml",
            Self::Cvpr => "badge-cvpr",
            Self::Iccv => "badge-iccv",
            Self::Eccv => "badge-eccv",
            Self::Acl => "badge-acl",
            Self::Emnlp => "badge-emnlp",
            Self::Naacl => "badge-naacl",
            Self::Aaai => "badge-aaai",
            Self::Ijcai => "badge-ijcai",
            Self::Published => "badge-published",
        }
    }
}

impl fmt::Display for VenueBadge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class())
    }
}

/// A venue name with its badge class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Venue {
    pub badge: VenueBadge,
    pub text: String,
}

/// Everything a host needs to draw one result card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperView {
    pub id: String,
    pub title: String,
    pub link: String,
    pub date: String,
    pub venue: Option<Venue>,
    pub code_link: Option<String>,
    pub authors: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub abstract_text: String,
    pub status: PublicationStatus,
    pub primary_category: Option<String>,
}

impl From<&Paper> for PaperView {
    fn from(p: &Paper) -> Self {
        Self {
            id: p.id.clone(),
            title: p.title.clone(),
            link: abstract_url(&p.id),
            date: p.published.clone(),
            venue: p.venue().map(|v| Venue {
                badge: VenueBadge::for_venue(v),
                text: v.to_string(),
            }),
            code_link: p.code_link.clone().filter(|c| !c.is_empty()),
            authors: p.authors.clone(),
            summary: p.summary.clone(),
            tags: p.tags.clone(),
            abstract_text: p.abstract_text.clone(),
            status: p.status(),
            primary_category: p.primary_category.clone().filter(|c| !c.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn badge_keywords() {
        assert_eq!(VenueBadge::for_venue("NeurIPS 2024"), VenueBadge::Neurips);
        assert_eq!(VenueBadge::for_venue("iclr 2025 (oral)"), VenueBadge::Iclr);
        assert_eq!(VenueBadge::for_venue("Findings of EMNLP"), VenueBadge::Emnlp);
        assert_eq!(VenueBadge::for_venue("ICSE 2025"), VenueBadge::Published);
        assert_eq!(VenueBadge::for_venue("AAAI-24").class(), "badge-aaai");
    }

    #[test]
    fn acl_keyword_shadows_naacl() {
        assert_eq!(VenueBadge::for_venue("NAACL 2024"), VenueBadge::Acl);
    }

    #[test]
    fn view_of_published_paper() {
        let p = Paper {
            id: "2401.01234".into(),
            title: "A Study".into(),
            published: "2024-01-03".into(),
            conference: Some("ICML 2024".into()),
            code_link: Some("https://github.com/x/y".into()),
            tags: vec!["LLM".into()],
            ..Default::default()
        };
        let v = PaperView::from(&p);
        assert_eq!(v.link, "https://arxiv.org/abs/2401.01234");
        assert_eq!(v.status, PublicationStatus::Published);
        let venue = v.venue.unwrap();
        assert_eq!(venue.badge, VenueBadge::Icml);
        assert_eq!(venue.text, "ICML 2024");
        assert_eq!(v.code_link.as_deref(), Some("https://github.com/x/y"));
    }

    #[test]
    fn empty_optionals_render_as_absent() {
        let p = Paper {
            id: "x".into(),
            conference: Some(String::new()),
            code_link: Some(String::new()),
            ..Default::default()
        };
        let v = PaperView::from(&p);
        assert!(v.venue.is_none());
        assert!(v.code_link.is_none());
        assert!(v.primary_category.is_none());
        assert_eq!(v.status, PublicationStatus::Preprint);
    }
}
