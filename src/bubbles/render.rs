use super::store::ParticleStore;
use crate::graphics::Canvas;

/// Clears the canvas and draws every particle, oldest first.
pub fn draw(store: &ParticleStore, canvas: &mut Canvas) {
    canvas.clear();

    for particle in store {
        canvas.color(particle.fill);
        canvas.alpha(particle.opacity);
        canvas.fill_circle(particle.position, particle.size);
    }
}
