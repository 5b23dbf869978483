use chrono::{DateTime, Duration, Utc};
use shared::domain::{BlogPost, PostId};

struct Curated {
    id: &'static str,
    title: &'static str,
    source: &'static str,
    url: &'static str,
    image: &'static str,
    age_hours: i64,
    excerpt: &'static str,
}

impl Curated {
    fn at(&self, now: DateTime<Utc>) -> BlogPost {
        BlogPost {
            id: PostId::from(self.id),
            title: self.title.to_string(),
            source: self.source.to_string(),
            url: self.url.to_string(),
            image: self.image.to_string(),
            published: now - Duration::hours(self.age_hours),
            excerpt: self.excerpt.to_string(),
            author: None,
        }
    }
}

const PER_SOURCE: &[Curated] = &[
    Curated {
        id: "3dpi-1",
        title: "Latest Advancements in Metal 3D Printing",
        source: "3D Printing Industry",
        url: "https://3dprintingindustry.com/news/category/metal",
        image: "https://via.placeholder.com/400x200/00B5AD/FFFFFF?text=Metal+3D+Printing",
        age_hours: 0,
        excerpt: "Exploring the latest developments in metal 3D printing technology and their applications in aerospace and automotive industries...",
    },
    Curated {
        id: "3dpi-2",
        title: "New Materials for Bioprinting Applications",
        source: "3D Printing Industry",
        url: "https://3dprintingindustry.com/news/category/medical",
        image: "https://via.placeholder.com/400x200/00B5AD/FFFFFF?text=Bioprinting",
        age_hours: 24,
        excerpt: "Researchers have developed new biocompatible materials that could revolutionize tissue engineering and organ printing...",
    },
    Curated {
        id: "all3dp-1",
        title: "Best 3D Printers of 2023",
        source: "All3DP",
        url: "https://all3dp.com/1/best-3d-printer",
        image: "https://via.placeholder.com/400x200/4CAF50/FFFFFF?text=Best+3D+Printers",
        age_hours: 0,
        excerpt: "A comprehensive guide to the best 3D printers for beginners, professionals, and everyone in between...",
    },
    Curated {
        id: "all3dp-2",
        title: "3D Printing Filament Guide",
        source: "All3DP",
        url: "https://all3dp.com/1/3d-printer-filament-types-3d-printing-3d-filament",
        image: "https://via.placeholder.com/400x200/4CAF50/FFFFFF?text=Filament+Guide",
        age_hours: 48,
        excerpt: "Everything you need to know about 3D printing filaments, from PLA and ABS to exotic materials like wood and metal-infused filaments...",
    },
    Curated {
        id: "3dins-1",
        title: "Advanced 3D Printing Techniques",
        source: "3D Insider",
        url: "https://3dinsider.com/3d-printing-techniques",
        image: "https://via.placeholder.com/400x200/2196F3/FFFFFF?text=Advanced+Techniques",
        age_hours: 72,
        excerpt: "Deep dive into advanced 3D printing techniques and how to master them for professional-quality prints...",
    },
    Curated {
        id: "3dins-2",
        title: "How to Calibrate Your 3D Printer",
        source: "3D Insider",
        url: "https://3dinsider.com/calibrate-3d-printer",
        image: "https://via.placeholder.com/400x200/2196F3/FFFFFF?text=Calibration",
        age_hours: 96,
        excerpt: "Step-by-step guide to perfectly calibrate your 3D printer for optimal print quality and reliability...",
    },
    Curated {
        id: "sculpteo-1",
        title: "Industrial 3D Printing Applications",
        source: "Sculpteo",
        url: "https://www.sculpteo.com/blog/industrial-3d-printing-applications",
        image: "https://via.placeholder.com/400x200/9C27B0/FFFFFF?text=Industrial+Applications",
        age_hours: 36,
        excerpt: "How 3D printing is transforming industrial manufacturing processes and enabling new possibilities...",
    },
    Curated {
        id: "3dpm-1",
        title: "The Future of 3D Printed Electronics",
        source: "3D Printing Media",
        url: "https://www.3dprintingmedia.network/news/future-3d-printed-electronics",
        image: "https://via.placeholder.com/400x200/2196F3/FFFFFF?text=3D+Printed+Electronics",
        age_hours: 60,
        excerpt: "Latest innovations in 3D printed electronic components and circuits that are revolutionizing the electronics industry...",
    },
];

const GLOBAL: &[Curated] = &[
    Curated {
        id: "1",
        title: "Latest Trends in 3D Printing Technology",
        source: "3D Printing Industry",
        url: "https://3dprintingindustry.com/news",
        image: "https://via.placeholder.com/400x200/00B5AD/FFFFFF?text=3D+Printing+Trends",
        age_hours: 0,
        excerpt: "Exploring the latest developments in 3D printing technology and their impact on various industries...",
    },
    Curated {
        id: "2",
        title: "Best 3D Printers for Beginners",
        source: "All3DP",
        url: "https://all3dp.com",
        image: "https://via.placeholder.com/400x200/4CAF50/FFFFFF?text=3D+Printers+Guide",
        age_hours: 24,
        excerpt: "A comprehensive guide to choosing your first 3D printer, with recommendations for different budgets and needs...",
    },
    Curated {
        id: "3",
        title: "Advanced 3D Printing Techniques",
        source: "3D Insider",
        url: "https://3dinsider.com",
        image: "https://via.placeholder.com/400x200/2196F3/FFFFFF?text=Advanced+Techniques",
        age_hours: 48,
        excerpt: "Deep dive into advanced 3D printing techniques and how to master them...",
    },
    Curated {
        id: "4",
        title: "3D Printing in Healthcare",
        source: "3D Printing Industry",
        url: "https://3dprintingindustry.com/news/category/medical",
        image: "https://via.placeholder.com/400x200/FF5722/FFFFFF?text=Healthcare",
        age_hours: 72,
        excerpt: "How 3D printing is revolutionizing healthcare with custom implants, prosthetics, and even bioprinting...",
    },
    Curated {
        id: "5",
        title: "Industrial 3D Printing Applications",
        source: "Sculpteo",
        url: "https://www.sculpteo.com/blog/industrial-3d-printing-applications",
        image: "https://via.placeholder.com/400x200/9C27B0/FFFFFF?text=Industrial+Applications",
        age_hours: 96,
        excerpt: "Real-world applications of industrial 3D printing technologies across different sectors...",
    },
];

pub fn source_posts(source: &str, now: DateTime<Utc>) -> Vec<BlogPost> {
    PER_SOURCE
        .iter()
        .filter(|post| post.source == source)
        .map(|post| post.at(now))
        .collect()
}

pub fn global_posts(now: DateTime<Utc>) -> Vec<BlogPost> {
    GLOBAL.iter().map(|post| post.at(now)).collect()
}
