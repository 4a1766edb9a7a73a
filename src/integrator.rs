//! Path tracing with multiple importance sampling between next-event
//! estimation and BRDF sampling. This is the renderer's core estimator:
//! everything else in the crate exists to feed it a scene, a light list
//! and a per-pixel stream of stratified samples.

use crate::math::{Color, Vector};
use crate::ray::Ray;
use crate::sampler::{Sampler, SamplerContainer};
use crate::shapes::Shape;

/// Power heuristic MIS weight with beta=2; returns 0 when both PDFs are
/// zero (nothing to weight).
fn power_heuristic(pdf_a: f32, pdf_b: f32) -> f32 {
    let a2 = pdf_a * pdf_a;
    let b2 = pdf_b * pdf_b;
    if a2 + b2 <= 0.0 {
        0.0
    } else {
        a2 / (a2 + b2)
    }
}

/// Trace `ray` through `scene`, estimating incident radiance along it.
/// `lights` is the flattened light list for the scene; `samplers` is the
/// pixel's sampler bundle and `sample_index` identifies which one of the
/// pixel's samples this call is evaluating (so every bounce of this call
/// draws consistently from the same stratified cell across the whole
/// render).
pub fn trace(
    scene: &dyn Shape,
    lights: &[&dyn Shape],
    mut current_ray: Ray,
    samplers: &SamplerContainer,
    sample_index: usize,
    max_depth: usize,
    num_light_samples: usize,
) -> Color {
    let mut result = Color::BLACK;
    let mut throughput = Color::WHITE;
    let mut num_bounces = 0usize;
    let mut num_dirac_bounces = 0usize;

    while num_bounces < max_depth {
        let mut isect = crate::ray::Intersection::new(current_ray);
        if !scene.intersect(&mut isect) {
            break;
        }
        let material = match isect.material {
            Some(m) => m,
            None => break,
        };

        // Emission is gathered here only for the camera-visible hit or
        // after a run of purely-Dirac bounces; every other bounce already
        // counted this light's contribution via next-event estimation, so
        // re-adding it here would double-count it.
        if num_bounces == 0 || num_bounces == num_dirac_bounces {
            result += throughput * material.emittance();
        }

        let (mat_color, brdf, brdf_weight) = material.evaluate(&isect);
        let brdf = match brdf {
            Some(b) => b,
            None => break,
        };

        let hit_point = isect.position();
        let normal = isect.normal;
        let wo = -current_ray.direction;

        if !brdf.is_dirac() && !lights.is_empty() && num_light_samples > 0 {
            let mut light_result = Color::BLACK;
            let selection_weight = lights.len() as f32 / num_light_samples as f32;

            for ls in 0..num_light_samples {
                let idx = sample_index * num_light_samples + ls;
                let pick_u = samplers.light_selection[num_bounces].sample_1d(idx);
                let light_index = ((pick_u * lights.len() as f32) as usize).min(lights.len() - 1);
                let light = lights[light_index];

                // Light -> BRDF: sample a point on the light, weight by
                // the BRDF's density at the resulting direction.
                let (lu1, lu2) = samplers.light[num_bounces].sample_2d(idx);
                let lu3 = samplers.light_element[num_bounces].sample_1d(idx);
                if let Some(sample) = light.sample_surface(hit_point, normal, current_ray.time, lu1, lu2, lu3) {
                    if sample.pdf > 0.0 {
                        let to_light = sample.point - hit_point;
                        let dist = to_light.length();
                        if dist > 0.0 {
                            let wi = to_light / dist;
                            let (pdf_b, f_b) = brdf.evaluate_sa(wi, wo, normal);
                            let shadow_ray = Ray::shadow(hit_point, wi, dist, current_ray.time);
                            if !scene.does_intersect(&shadow_ray) {
                                let cos_theta = wi.dot(&Vector::from(normal)).abs();
                                let w_l = power_heuristic(sample.pdf, pdf_b);
                                let contrib = light.emitted() * isect.color_modifier * mat_color * f_b * cos_theta * w_l / (sample.pdf * brdf_weight);
                                light_result += contrib * selection_weight;
                            }
                        }
                    }
                }

                // BRDF -> light: sample a direction from the BRDF, check
                // whether it lands on the chosen light.
                let (bu1, bu2) = samplers.brdf[num_bounces].sample_2d(idx);
                let (wi_b, pdf_b, f_b) = brdf.sample_sa(bu1, bu2, wo, normal);
                if pdf_b > 0.0 {
                    let bounce_ray = Ray::spawn(hit_point, wi_b, crate::ray::RAY_T_MAX, current_ray.time);
                    let mut bounce_isect = crate::ray::Intersection::new(bounce_ray);
                    if scene.intersect(&mut bounce_isect) {
                        if let Some(hit_shape) = bounce_isect.shape {
                            if std::ptr::eq(hit_shape, light) {
                                let pdf_l = light.pdf_sa(hit_point, normal, current_ray.time, bounce_isect.position(), bounce_isect.normal);
                                if pdf_l > 0.0 {
                                    let cos_theta = wi_b.dot(&Vector::from(normal)).abs();
                                    let w_b = power_heuristic(pdf_b, pdf_l);
                                    let contrib = light.emitted() * isect.color_modifier * mat_color * f_b * cos_theta * w_b / (pdf_b * brdf_weight);
                                    light_result += contrib * selection_weight;
                                }
                            }
                        }
                    }
                }
            }
            result += throughput * light_result;
        }

        let (eu1, eu2) = samplers.next_bounce[num_bounces].sample_2d(sample_index);
        let (wi, pdf, f) = brdf.sample_sa(eu1, eu2, wo, normal);
        if pdf <= 0.0 {
            break;
        }
        let cos_theta = wi.dot(&Vector::from(normal)).abs();
        throughput = throughput * isect.color_modifier * mat_color * f * cos_theta / (pdf * brdf_weight);
        current_ray = Ray::spawn(hit_point, wi, crate::ray::RAY_T_MAX, current_ray.time);
        num_bounces += 1;
        if brdf.is_dirac() {
            num_dirac_bounces += 1;
        }
    }

    result
}
