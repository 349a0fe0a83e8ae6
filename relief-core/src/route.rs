use crate::incident::Coordinates;
use crate::report::format_coordinate;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
    Map,
    Report {
        lat: Option<String>,
        lng: Option<String>,
    },
    Alerts,
    Admin,
}

impl Route {
    /// Parses a path with optional query. Unknown paths land on the dashboard.
    pub fn parse(path_and_query: &str) -> Self {
        let trimmed = path_and_query.trim().trim_start_matches('#');
        let (path, query) = match trimmed.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (trimmed, None),
        };

        match path.trim_end_matches('/') {
            "" => Route::Login,
            "/dashboard" => Route::Dashboard,
            "/map" => Route::Map,
            "/report" => {
                let param = |name: &str| {
                    query.and_then(|q| {
                        q.split('&')
                            .filter_map(|pair| pair.split_once('='))
                            .find(|(k, _)| *k == name)
                            .map(|(_, v)| v.to_string())
                            .filter(|v| !v.is_empty())
                    })
                };
                match (param("lat"), param("lng")) {
                    (Some(lat), Some(lng)) => Route::Report {
                        lat: Some(lat),
                        lng: Some(lng),
                    },
                    _ => Route::Report {
                        lat: None,
                        lng: None,
                    },
                }
            }
            "/alerts" => Route::Alerts,
            "/admin" => Route::Admin,
            _ => Route::Dashboard,
        }
    }

    pub fn href(&self) -> String {
        match self {
            Route::Login => "/".into(),
            Route::Dashboard => "/dashboard".into(),
            Route::Map => "/map".into(),
            Route::Report {
                lat: Some(lat),
                lng: Some(lng),
            } => format!("/report?lat={lat}&lng={lng}"),
            Route::Report { .. } => "/report".into(),
            Route::Alerts => "/alerts".into(),
            Route::Admin => "/admin".into(),
        }
    }

    pub fn report_at(location: Coordinates) -> Self {
        Route::Report {
            lat: Some(format_coordinate(location.lat)),
            lng: Some(format_coordinate(location.lng)),
        }
    }

    pub fn requires_auth(&self) -> bool {
        matches!(self, Route::Admin)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Login => "Sign in",
            Route::Dashboard => "Dashboard",
            Route::Map => "Live Map",
            Route::Report { .. } => "Report Disaster",
            Route::Alerts => "Alerts",
            Route::Admin => "Admin Panel",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_paths() {
        assert_eq!(Route::parse("/"), Route::Login);
        assert_eq!(Route::parse("#/map"), Route::Map);
        assert_eq!(Route::parse("/admin/"), Route::Admin);
        assert_eq!(Route::parse("/nowhere"), Route::Dashboard);
    }

    #[test]
    fn report_route_carries_coordinates() {
        let route = Route::parse("/report?lat=10.000000&lng=20.500000");
        assert_eq!(
            route,
            Route::Report {
                lat: Some("10.000000".into()),
                lng: Some("20.500000".into()),
            }
        );
        assert_eq!(route.href(), "/report?lat=10.000000&lng=20.500000");
    }

    #[test]
    fn half_a_pair_is_ignored() {
        assert_eq!(
            Route::parse("/report?lat=10"),
            Route::Report { lat: None, lng: None }
        );
    }

    #[test]
    fn report_at_formats_six_decimals() {
        let route = Route::report_at(Coordinates::new(10.0, -20.123_456));
        assert_eq!(route.href(), "/report?lat=10.000000&lng=-20.123456");
    }

    #[test]
    fn only_admin_needs_auth() {
        assert!(Route::Admin.requires_auth());
        assert!(!Route::Map.requires_auth());
    }
}
