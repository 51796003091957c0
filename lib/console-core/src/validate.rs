//! Form validation
//!
//! Every check runs; all failures are reported together so the form can
//! surface the complete list. Messages carry 1-based route/service indices
//! for multi-route forms. An empty result means the form may be compiled.

use console_api::{FormModel, Termination};

pub fn validate(form: &FormModel) -> Vec<String> {
    let mut errors = Vec::new();

    if form.name.trim().is_empty() {
        errors.push("Name is required.".to_string());
    }

    if form.fqdn.trim().is_empty() {
        errors.push("Hostname is required.".to_string());
    }

    if form.ingress_class_name.trim().is_empty() {
        errors.push("Proxy type is required.".to_string());
    }

    if form.routes.is_empty() {
        errors.push("At least one route is required.".to_string());
    }

    for (route_index, route) in form.routes.iter().enumerate() {
        let route_number = route_index + 1;

        if route.prefix.trim().is_empty() {
            errors.push(format!("Route {}: path prefix is required.", route_number));
        }

        if route.services.is_empty() {
            errors.push(format!(
                "Route {}: at least one service is required.",
                route_number
            ));
        }

        for (service_index, service) in route.services.iter().enumerate() {
            let service_number = service_index + 1;

            if service.name.is_empty() {
                errors.push(format!(
                    "Route {}, service {}: service name is required.",
                    route_number, service_number
                ));
            }
            if service.port.is_empty() {
                errors.push(format!(
                    "Route {}, service {}: service port is required.",
                    route_number, service_number
                ));
            }
            if service.validation {
                if service.ca_secret.as_deref().unwrap_or("").is_empty() {
                    errors.push(format!(
                        "Route {}, service {}: CA secret is required when upstream validation is enabled.",
                        route_number, service_number
                    ));
                }
                if service.subject_name.as_deref().unwrap_or("").trim().is_empty() {
                    errors.push(format!(
                        "Route {}, service {}: subject name is required when upstream validation is enabled.",
                        route_number, service_number
                    ));
                }
            }
        }
    }

    if form.conditional.secure_route {
        if form.conditional.termination.is_none() {
            errors.push("TLS termination is required for a secure route.".to_string());
        }
        if form.conditional.termination != Some(Termination::Passthrough)
            && form.conditional.secrets.as_deref().unwrap_or("").is_empty()
        {
            errors.push("A certificate secret is required unless termination is passthrough.".to_string());
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use console_api::{RouteEntry, SecuritySettings, ServiceEntry};

    fn valid_form() -> FormModel {
        FormModel {
            name: "app1".to_string(),
            ingress_class_name: "public".to_string(),
            fqdn: "foo".to_string(),
            routes: vec![RouteEntry {
                services: vec![ServiceEntry {
                    name: "svc1".to_string(),
                    port: "8080".to_string(),
                    ..ServiceEntry::default()
                }],
                ..RouteEntry::default()
            }],
            ..FormModel::new("team-a")
        }
    }

    #[test]
    fn test_valid_form_passes() {
        assert!(validate(&valid_form()).is_empty());
    }

    #[test]
    fn test_missing_top_level_fields_all_reported() {
        let form = FormModel {
            routes: vec![],
            ..FormModel::new("team-a")
        };
        let errors = validate(&form);
        assert!(errors.iter().any(|error| error.contains("Name")));
        assert!(errors.iter().any(|error| error.contains("Hostname")));
        assert!(errors.iter().any(|error| error.contains("Proxy type")));
        assert!(errors.iter().any(|error| error.contains("At least one route")));
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_validation_gate_requires_ca_secret() {
        let mut form = valid_form();
        form.routes[0].services[0].validation = true;
        form.routes[0].services[0].ca_secret = Some(String::new());
        form.routes[0].services[0].subject_name = Some("svc1.team-a.svc".to_string());

        let errors = validate(&form);
        assert!(errors.iter().any(|error| error.contains("CA secret")));

        // Without the gate the same empty secret is fine.
        form.routes[0].services[0].validation = false;
        assert!(validate(&form).is_empty());
    }

    #[test]
    fn test_errors_carry_one_based_indices() {
        let mut form = valid_form();
        form.routes.push(RouteEntry {
            prefix: "/api".to_string(),
            services: vec![
                ServiceEntry {
                    name: "svc2".to_string(),
                    port: "9000".to_string(),
                    ..ServiceEntry::default()
                },
                ServiceEntry::default(),
            ],
            ..RouteEntry::default()
        });

        let errors = validate(&form);
        assert!(errors
            .iter()
            .any(|error| error.contains("Route 2, service 2: service name is required.")));
    }

    #[test]
    fn test_secure_route_needs_termination_and_secret() {
        let mut form = valid_form();
        form.conditional = SecuritySettings {
            secure_route: true,
            ..SecuritySettings::default()
        };
        let errors = validate(&form);
        assert!(errors.iter().any(|error| error.contains("TLS termination")));
        assert!(errors.iter().any(|error| error.contains("certificate secret")));

        form.conditional.termination = Some(Termination::Passthrough);
        assert!(validate(&form).is_empty());
    }
}
