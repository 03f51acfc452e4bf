//! Task routing - the finite map from task kind to downstream endpoint.
//!
//! Each kind resolves to exactly one service and path, so routing is total
//! and ordering-insensitive. The job id rides as the only payload, a path
//! parameter on a GET.

use url::Url;

use crate::domains::jobs::{JobId, TaskKind};

/// Base URLs of the downstream services, parsed once at startup.
#[derive(Debug, Clone)]
pub struct ServiceEndpoints {
    pub scraping: Url,
    pub media_gen: Url,
    pub instagram: Url,
    pub whatsapp: Url,
}

impl ServiceEndpoints {
    /// Resolve the dispatch URL for a job.
    pub fn dispatch_url(&self, kind: TaskKind, job_id: JobId) -> String {
        let (base, path) = match kind {
            TaskKind::WebsiteScrape => (&self.scraping, "website_scrape"),
            TaskKind::InstagramScrape => (&self.scraping, "instagram_scrape"),
            TaskKind::CreateMedia => (&self.media_gen, "generate-image"),
            TaskKind::MonitorVideo => (&self.media_gen, "video-status"),
            TaskKind::PostImageInstagram => (&self.instagram, "post-image"),
            TaskKind::PostImageWhatsapp => (&self.whatsapp, "post-image"),
            TaskKind::PostVideoInstagram => (&self.instagram, "post-video"),
            TaskKind::PostVideoWhatsapp => (&self.whatsapp, "post-video"),
        };
        format!("{}/{}/{}", base.as_str().trim_end_matches('/'), path, job_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoints() -> ServiceEndpoints {
        ServiceEndpoints {
            scraping: Url::parse("http://scraping:5000").unwrap(),
            media_gen: Url::parse("http://media-gen:5001").unwrap(),
            instagram: Url::parse("http://instagram:5002").unwrap(),
            whatsapp: Url::parse("http://whatsapp:5003/").unwrap(),
        }
    }

    #[test]
    fn scrape_kinds_route_to_the_scraping_service() {
        let endpoints = endpoints();
        assert_eq!(
            endpoints.dispatch_url(TaskKind::WebsiteScrape, 7),
            "http://scraping:5000/website_scrape/7"
        );
        assert_eq!(
            endpoints.dispatch_url(TaskKind::InstagramScrape, 7),
            "http://scraping:5000/instagram_scrape/7"
        );
    }

    #[test]
    fn media_kinds_route_to_the_media_gen_service() {
        let endpoints = endpoints();
        assert_eq!(
            endpoints.dispatch_url(TaskKind::CreateMedia, 12),
            "http://media-gen:5001/generate-image/12"
        );
        assert_eq!(
            endpoints.dispatch_url(TaskKind::MonitorVideo, 12),
            "http://media-gen:5001/video-status/12"
        );
    }

    #[test]
    fn whatsapp_posts_route_to_whatsapp_not_instagram() {
        let endpoints = endpoints();
        assert_eq!(
            endpoints.dispatch_url(TaskKind::PostImageWhatsapp, 3),
            "http://whatsapp:5003/post-image/3"
        );
        assert_eq!(
            endpoints.dispatch_url(TaskKind::PostImageInstagram, 3),
            "http://instagram:5002/post-image/3"
        );
    }

    #[test]
    fn video_posts_route_like_their_image_counterparts() {
        let endpoints = endpoints();
        assert_eq!(
            endpoints.dispatch_url(TaskKind::PostVideoInstagram, 9),
            "http://instagram:5002/post-video/9"
        );
        assert_eq!(
            endpoints.dispatch_url(TaskKind::PostVideoWhatsapp, 9),
            "http://whatsapp:5003/post-video/9"
        );
    }
}
