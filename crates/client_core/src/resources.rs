use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Main,
    Blog,
    News,
    Guides,
    Resources,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SectionLink {
    pub kind: SectionKind,
    pub url: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FeaturedPost {
    pub title: &'static str,
    pub description: &'static str,
    pub image_url: &'static str,
    pub url: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ResourceSite {
    pub title: &'static str,
    pub description: &'static str,
    pub url: &'static str,
    pub sections: &'static [SectionLink],
    pub latest: &'static [FeaturedPost],
}

impl ResourceSite {
    pub fn section(&self, kind: SectionKind) -> Option<&'static str> {
        self.sections
            .iter()
            .find(|section| section.kind == kind)
            .map(|section| section.url)
    }
}

const fn link(kind: SectionKind, url: &'static str) -> SectionLink {
    SectionLink { kind, url }
}

pub const SITES: &[ResourceSite] = &[
    ResourceSite {
        title: "3D Printing Industry",
        description: "Latest news in 3D printing technology",
        url: "https://3dprintingindustry.com",
        sections: &[
            link(SectionKind::Main, "https://3dprintingindustry.com"),
            link(SectionKind::Blog, "https://3dprintingindustry.com/news"),
            link(
                SectionKind::News,
                "https://3dprintingindustry.com/news/category/industry-news",
            ),
        ],
        latest: &[
            FeaturedPost {
                title: "Sunlu FilaDryer S2 Review",
                description: "Technical specifications and pricing of the new filament drying system",
                image_url: "https://3dprintingindustry.com/wp-content/uploads/2023/06/sunlu-filadryer-s2-featured.jpg",
                url: "https://3dprintingindustry.com/news/sunlu-filadryer-s2-review-technical-specifications-pricing-223774/",
            },
            FeaturedPost {
                title: "Automatic Exposure System for Volumetric 3D Printing",
                description: "New research in volumetric additive manufacturing",
                image_url: "https://3dprintingindustry.com/wp-content/uploads/2023/05/volumetric-3d-printing-research.jpg",
                url: "https://3dprintingindustry.com/news/researchers-develop-automatic-exposure-system-volumetric-3d-printing-223756/",
            },
        ],
    },
    ResourceSite {
        title: "3D Printing.com",
        description: "Everything about 3D printing",
        url: "https://3dprinting.com",
        sections: &[
            link(SectionKind::Main, "https://3dprinting.com"),
            link(SectionKind::Blog, "https://3dprinting.com/news"),
            link(SectionKind::Guides, "https://3dprinting.com/how-to"),
        ],
        latest: &[FeaturedPost {
            title: "Latest Advances in Metal 3D Printing",
            description: "New developments in metal additive manufacturing",
            image_url: "https://3dprinting.com/wp-content/uploads/2023/metal-3d-printing.jpg",
            url: "https://3dprinting.com/news/metal-3d-printing-advances-2023",
        }],
    },
    ResourceSite {
        title: "All3DP",
        description: "3D printing guides and reviews",
        url: "https://all3dp.com",
        sections: &[
            link(SectionKind::Main, "https://all3dp.com"),
            link(SectionKind::Blog, "https://all3dp.com/1/3d-printing-news"),
            link(SectionKind::Guides, "https://all3dp.com/2/3d-printing-guides"),
        ],
        latest: &[FeaturedPost {
            title: "Best 3D Printers of 2023",
            description: "Comprehensive guide to this year's top 3D printers",
            image_url: "https://cdn.all3dp.com/wp-content/uploads/2023/01/03152857/best-3d-printer-lead-fixed.jpg",
            url: "https://all3dp.com/1/best-3d-printer/",
        }],
    },
    ResourceSite {
        title: "3D Printing Media",
        description: "Professional 3D printing news",
        url: "https://www.3dprintingmedia.network",
        sections: &[
            link(SectionKind::Main, "https://www.3dprintingmedia.network"),
            link(SectionKind::Blog, "https://www.3dprintingmedia.network/news"),
            link(
                SectionKind::News,
                "https://www.3dprintingmedia.network/category/industry",
            ),
        ],
        latest: &[FeaturedPost {
            title: "The Future of 3D Printed Electronics",
            description: "Latest innovations in 3D printed electronic components",
            image_url: "https://www.3dprintingmedia.network/wp-content/uploads/2023/06/3d-printed-electronics.jpg",
            url: "https://www.3dprintingmedia.network/news/future-3d-printed-electronics",
        }],
    },
    ResourceSite {
        title: "Sculpteo",
        description: "3D printing services and resources",
        url: "https://www.sculpteo.com",
        sections: &[
            link(SectionKind::Main, "https://www.sculpteo.com"),
            link(SectionKind::Blog, "https://www.sculpteo.com/blog"),
            link(
                SectionKind::Resources,
                "https://www.sculpteo.com/en/3d-learning-hub",
            ),
        ],
        latest: &[FeaturedPost {
            title: "Industrial 3D Printing Applications",
            description: "Real-world applications of industrial 3D printing",
            image_url: "https://www.sculpteo.com/blog/wp-content/uploads/2023/05/industrial-3d-printing.jpg",
            url: "https://www.sculpteo.com/blog/industrial-3d-printing-applications",
        }],
    },
    ResourceSite {
        title: "3D Insider",
        description: "In-depth 3D printing coverage",
        url: "https://3dinsider.com",
        sections: &[
            link(SectionKind::Main, "https://3dinsider.com"),
            link(SectionKind::Blog, "https://3dinsider.com/category/news"),
            link(SectionKind::Guides, "https://3dinsider.com/category/guides"),
        ],
        latest: &[FeaturedPost {
            title: "Advanced 3D Printing Materials Guide",
            description: "Complete guide to modern 3D printing materials",
            image_url: "https://3dinsider.com/wp-content/uploads/2023/06/3d-printing-materials.jpg",
            url: "https://3dinsider.com/3d-printing-materials/",
        }],
    },
];

pub fn find_site(title: &str) -> Option<&'static ResourceSite> {
    SITES
        .iter()
        .find(|site| site.title.eq_ignore_ascii_case(title.trim()))
}
