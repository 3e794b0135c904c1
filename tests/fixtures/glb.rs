//! Binary glTF fixtures shared by the unit and integration tests.

// each test crate uses a subset
#![allow(dead_code)]

/// Minimal binary glTF: `Root` (y = 1) with a textured triangle child
/// named after `mesh_name`.
pub(crate) fn triangle_glb(mesh_name: &str) -> Vec<u8> {
    triangle_glb_with(mesh_name, "")
}

/// [`triangle_glb`] with `extra` spliced into the top-level JSON object.
/// `extra` must end with a comma.
pub(crate) fn triangle_glb_with(mesh_name: &str, extra: &str) -> Vec<u8> {
    let mut bin = Vec::new();
    for v in [[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
        for c in v {
            bin.extend_from_slice(&c.to_le_bytes());
        }
    }
    for i in [0u16, 1, 2] {
        bin.extend_from_slice(&i.to_le_bytes());
    }
    let byte_length = bin.len();
    while bin.len() % 4 != 0 {
        bin.push(0);
    }

    let mut json = format!(
        r#"{{"asset":{{"version":"2.0"}},{extra}"scene":0,"scenes":[{{"nodes":[0]}}],
"nodes":[{{"name":"Root","translation":[0,1,0],"children":[1]}},{{"name":"{mesh_name}","mesh":0}}],
"meshes":[{{"name":"{mesh_name}","primitives":[{{"attributes":{{"POSITION":0}},"indices":1,"material":0}}]}}],
"materials":[{{"name":"Shell","pbrMetallicRoughness":{{"baseColorFactor":[1,0,0,1],"metallicFactor":0.2,"roughnessFactor":0.6,"baseColorTexture":{{"index":0}}}}}}],
"textures":[{{"sampler":0,"source":0}}],
"images":[{{"uri":"shell.png"}}],
"samplers":[{{"magFilter":9728,"minFilter":9984}}],
"buffers":[{{"byteLength":{byte_length}}}],
"bufferViews":[{{"buffer":0,"byteOffset":0,"byteLength":36}},{{"buffer":0,"byteOffset":36,"byteLength":6}}],
"accessors":[{{"bufferView":0,"componentType":5126,"count":3,"type":"VEC3","min":[0,0,0],"max":[1,1,0]}},{{"bufferView":1,"componentType":5123,"count":3,"type":"SCALAR"}}]}}"#
    )
    .into_bytes();
    while json.len() % 4 != 0 {
        json.push(b' ');
    }

    let total = 12 + 8 + json.len() + 8 + bin.len();
    let mut glb = Vec::with_capacity(total);
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total as u32).to_le_bytes());
    glb.extend_from_slice(&(json.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"JSON");
    glb.extend_from_slice(&json);
    glb.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"BIN\0");
    glb.extend_from_slice(&bin);
    glb
}
