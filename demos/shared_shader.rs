//! Shared Shader Demo
//!
//! One shader program shared by several materials. The materials only
//! borrow it, so dropping them leaves the program alive for the next batch.
//!
//! Run with: `cargo run --example shared_shader`

use raywrap::prelude::*;

const FRAGMENT: &str = "#version 330
in vec2 fragTexCoord;
uniform sampler2D texture0;
uniform vec4 tint;
out vec4 finalColor;
void main() {
    finalColor = texture(texture0, fragTexCoord) * tint;
}
";

const FRAMES: u32 = 90;

fn main() -> anyhow::Result<()> {
    raywrap::init_logging();

    let mut window = Window::new(WindowConfig::default().with_title("shared shader"))?;
    let camera = Camera3D {
        position: Vector3::new(6.0, 6.0, 6.0),
        ..Camera3D::default()
    };

    let mut shader = Shader::load_from_memory(None, Some(FRAGMENT))?;
    let tint = shader.location("tint");
    shader.set_value(tint, Color::new(255, 200, 200, 255));

    let mut models = Vec::new();
    for (i, color) in [Color::RED, Color::GREEN, Color::BLUE].into_iter().enumerate() {
        let mut model = Model::from_mesh(Mesh::gen_cube(1.0, 1.0, 1.0)?)?;
        let mut material = Material::load_default()?;
        material
            .share_shader(&shader)
            .set_color(MaterialMapIndex::Albedo, color);
        model.set_material(0, material)?;
        models.push((Vector3::new(i as f32 * 2.0 - 2.0, 0.5, 0.0), model));
    }

    for _ in 0..FRAMES {
        let mut frame = window.begin_drawing();
        frame.clear_background(Color::RAYWHITE);
        {
            let _world = camera.begin();
            let _program = shader.begin();
            for (position, model) in &models {
                model.draw(*position, 1.0, Color::WHITE);
            }
            frame.draw_grid(10, 1.0);
        }
        frame.draw_text("three materials, one program", 10, 10, 20, Color::DARKGRAY);
    }

    drop(models);
    log::info!("shader still ready after the models are gone: {}", shader.is_ready());
    Ok(())
}
